pub struct Icons;

impl Icons {
    pub const SCHOOL: &str = "🏛️";
    pub const CHECK: &str = "✅";
    pub const INFO: &str = "ℹ️";
    pub const STATS: &str = "📊";
    pub const DEAN: &str = "🎓";
    pub const PERSON: &str = "👤";
    pub const PHONE: &str = "📱";
    pub const MAIL: &str = "✉️";
    pub const BOOK: &str = "📚";
    pub const MAP: &str = "📍";
    pub const PHOTO: &str = "🖼️";
    pub const EYE: &str = "👀";
}
