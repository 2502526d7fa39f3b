pub mod icons;
pub mod output;
pub mod table;
pub mod theme;

pub use icons::Icons;
pub use output::{dim, header, info, member_card, section, success, summary_row};
pub use table::{interest_table, member_table, stats_table, InterestRow, MemberRow};
pub use theme::{theme, Theme};
