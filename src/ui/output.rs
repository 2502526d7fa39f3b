use crate::member::{Contact, Member, Role};
use crate::ui::{theme, Icons};
use owo_colors::OwoColorize;

pub fn header(text: &str) {
    println!("{} {}", Icons::SCHOOL, text.style(theme().header.clone()));
}

pub fn success(label: &str) {
    println!("{} {}", Icons::CHECK, label.style(theme().success.clone()));
}

pub fn info(label: &str, value: &str) {
    println!(
        "{} {}: {}",
        Icons::INFO.style(theme().info.clone()),
        label.style(theme().dim.clone()),
        value
    );
}

pub fn section(title: &str) {
    println!();
    println!("━{}━", title.style(theme().header.clone()));
}

pub fn dim(text: &str) -> String {
    text.style(theme().dim.clone()).to_string()
}

pub fn summary_row(label: &str, value: &str) {
    println!("  {} {}", label.style(theme().dim.clone()), value);
}

/// Print a dean or any single member as a small card
pub fn member_card(member: &Member) {
    let icon = match member.role() {
        Role::ComplexDean | Role::FacultyDean => Icons::DEAN,
        Role::Academic | Role::Authority => Icons::PERSON,
    };
    let name = member.full_name();
    match &member.title {
        Some(title) => println!("{} {} {}", icon, dim(title), name.style(theme().accent.clone())),
        None => println!("{} {}", icon, name.style(theme().accent.clone())),
    }
    if let Some(field) = &member.field {
        summary_row("Field:", field);
    }
    if let Some(interest) = &member.interest {
        summary_row("Interest:", interest);
    }
    match member.contact() {
        Contact::Email(address) => summary_row(Icons::MAIL, address),
        Contact::Phone(number) => summary_row(Icons::PHONE, number),
    }
    if member.has_image() {
        summary_row(Icons::PHOTO, "photo on file");
    }
}
