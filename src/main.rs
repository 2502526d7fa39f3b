//! Tec CLI - browse the technical-engineering complex directory

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tec::config::{self, TecConfig};
use tec::overview::{GroupOverview, HomeOverview};
use tec::reference::{self, Group};
use tec::ui::{self, Icons};
use tec::{Interest, Member, Repository};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "tec")]
#[command(version)]
#[command(about = "Directory of the technical-engineering complex")]
#[command(long_about = r#"
Tec reads the complex's local directory database:
  • Dean of the complex and headline statistics
  • Deans, academics and authorities of each group
  • Study interests by educational stage

Example usage:
  tec home
  tec group electrical-mechanical --stage 2
  tec add-member --first-name Ali --last-name Rezaei --contact ali@tec.ac.ir --field کامپیوتر --dean-of-faculty false
"#)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Print JSON instead of tables
    #[arg(long, global = true)]
    json: bool,

    /// Path to the config file (defaults to ./tec.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Path to the database file (overrides the config)
    #[arg(short, long, global = true)]
    database: Option<PathBuf>,

    /// Collation locale (overrides the config)
    #[arg(long, global = true)]
    locale: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a config file
    Init {
        /// Pre-populated database to copy on first run
        #[arg(long)]
        template: Option<String>,

        /// Overwrite an existing config
        #[arg(long)]
        force: bool,
    },

    /// Dean of the complex, statistics, facilities and former deans
    Home,

    /// Dean, academics, authorities and interests of one group
    Group {
        /// computer, electrical-mechanical, civil or architectural
        group: Group,

        /// Only list interests of this stage
        #[arg(short, long)]
        stage: Option<String>,
    },

    /// History, location and contact information
    About,

    /// List the educational stages
    Stages,

    /// Show database statistics
    Stats,

    /// Add a member
    AddMember {
        #[command(flatten)]
        fields: MemberArgs,

        /// Explicit id (assigned automatically when omitted)
        #[arg(long)]
        id: Option<i64>,
    },

    /// Replace fields of an existing member
    UpdateMember {
        /// Id of the member to update
        id: i64,

        #[command(flatten)]
        fields: MemberArgs,

        /// Remove the stored photo
        #[arg(long, conflicts_with = "image")]
        clear_image: bool,
    },

    /// Add an interest
    AddInterest {
        #[arg(long)]
        name: String,

        #[arg(long)]
        field: String,

        #[arg(long)]
        stage: String,
    },

    /// Print a group's academics every time they change (Ctrl-C to stop)
    Watch {
        group: Group,
    },
}

#[derive(clap::Args)]
struct MemberArgs {
    #[arg(long)]
    first_name: Option<String>,

    #[arg(long)]
    last_name: Option<String>,

    /// Email for academics, phone extension for authorities
    #[arg(long)]
    contact: Option<String>,

    #[arg(long)]
    field: Option<String>,

    /// Only set for the dean of the complex
    #[arg(long)]
    interest: Option<String>,

    /// Academic rank
    #[arg(long)]
    title: Option<String>,

    /// true for a faculty dean, false for an academic; omit for an authority
    #[arg(long)]
    dean_of_faculty: Option<bool>,

    /// Photo file stored with the member
    #[arg(long)]
    image: Option<PathBuf>,
}

impl MemberArgs {
    /// Overlay the given flags onto `member`
    fn apply(self, mut member: Member) -> anyhow::Result<Member> {
        if let Some(v) = self.first_name {
            member.first_name = v;
        }
        if let Some(v) = self.last_name {
            member.last_name = v;
        }
        if let Some(v) = self.contact {
            member.contact_info = v;
        }
        if self.field.is_some() {
            member.field = self.field;
        }
        if self.interest.is_some() {
            member.interest = self.interest;
        }
        if self.title.is_some() {
            member.title = self.title;
        }
        if self.dean_of_faculty.is_some() {
            member.dean_of_faculty = self.dean_of_faculty;
        }
        if let Some(path) = self.image {
            member.image_bytes = Some(std::fs::read(&path)?);
        }
        Ok(member)
    }
}

fn resolve_config(cli: &Cli) -> anyhow::Result<TecConfig> {
    let mut config = config::load_config(cli.config.as_deref())?.unwrap_or_default();
    if let Some(database) = &cli.database {
        config.database = Some(database.to_string_lossy().to_string());
    }
    if let Some(locale) = &cli.locale {
        config.locale = Some(locale.clone());
    }
    Ok(config)
}

fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let config = resolve_config(&cli)?;

    if let Commands::Init { template, force } = &cli.command {
        let path = cli.config.clone().unwrap_or_else(config::default_config_path);
        let written = TecConfig {
            database: Some(config.database_path().to_string_lossy().to_string()),
            template: template.clone().or(config.template.clone()),
            locale: Some(config.locale().to_string()),
        };
        config::write_config(&path, &written, *force)?;
        ui::success(&format!("Wrote {}", path.display()));
        return Ok(());
    }

    tracing::debug!("Using database {}", config.database_path().display());
    let repo = Repository::new(config.open_store()?);

    match cli.command {
        Commands::Init { .. } => {}

        Commands::Home => {
            let home = HomeOverview::load(&repo).await?;
            if cli.json {
                return print_json(&home);
            }

            ui::header("Technical-Engineering Complex");
            ui::section(reference::COMPLEX_HISTORY.0);
            println!("{}", reference::COMPLEX_HISTORY.1);

            ui::section("In a glimpse");
            let stats: Vec<(&str, String)> = home
                .statistics
                .iter()
                .map(|s| (s.label, s.value.to_string()))
                .collect();
            println!("{}", ui::stats_table(&stats));

            ui::section("Dean of the complex");
            match &home.dean_of_complex {
                Some(dean) => ui::member_card(dean),
                None => println!("{}", ui::dim("Not listed")),
            }

            ui::section("Former deans");
            for dean in reference::FORMER_DEANS {
                ui::summary_row(dean.term, &dean.full_name());
            }

            ui::section("Facilities");
            let facilities: Vec<(&str, String)> = reference::FACILITIES
                .iter()
                .map(|f| (f.name, f.count.to_string()))
                .collect();
            println!("{}", ui::stats_table(&facilities));
        }

        Commands::Group { group, stage } => {
            let overview = GroupOverview::load(&repo, group).await?;
            if cli.json {
                return print_json(&overview);
            }

            ui::header(&format!("{} group", group.title()));

            ui::section("Dean of faculty");
            match &overview.dean_of_faculty {
                Some(dean) => ui::member_card(dean),
                None => println!("{}", ui::dim("Not listed")),
            }

            ui::section("Academics");
            println!("{}", ui::member_table(&overview.academics));

            ui::section("Authorities");
            println!("{}", ui::member_table(&overview.authorities));

            ui::section("Interests");
            for (stage_name, interests) in overview.interests_by_stage() {
                if stage.as_deref().is_some_and(|s| s != stage_name) {
                    continue;
                }
                println!("{} {}", Icons::BOOK, stage_name);
                println!("{}", ui::interest_table(interests.iter().copied()));
            }
        }

        Commands::About => {
            ui::header("About");
            ui::info("History", reference::COMPLEX_HISTORY.1);
            ui::info(Icons::MAP, &reference::map_uri());
            ui::section("Contact");
            ui::info(Icons::MAIL, &reference::university_email().uri());
            ui::info(Icons::PHONE, &reference::university_phone().uri());
            ui::summary_row("Address:", reference::ADDRESS);
            ui::summary_row("Opening hours:", reference::OPENING_HOURS);
            ui::summary_row("Groups:", &Group::all().iter().map(|g| g.title()).collect::<Vec<_>>().join(", "));
        }

        Commands::Stages => {
            let stages = repo.educational_stages().first().await?;
            if cli.json {
                return print_json(&stages);
            }
            if stages.is_empty() {
                println!("{}", ui::dim("No stages recorded."));
            }
            for stage in stages {
                println!("- {}", stage);
            }
        }

        Commands::Stats => {
            let stats = repo.stats().first().await?;
            if cli.json {
                return print_json(&stats);
            }
            println!("{} Tec Statistics ({})", Icons::STATS, config.database_path().display());
            println!("------------------------------------");
            println!("{}", stats);
        }

        Commands::AddMember { fields, id } => {
            let (Some(first), Some(last), Some(contact)) =
                (fields.first_name.clone(), fields.last_name.clone(), fields.contact.clone())
            else {
                anyhow::bail!("--first-name, --last-name and --contact are required");
            };
            let member = fields.apply(Member::new(first, last, contact).with_id(id.unwrap_or(0)))?;
            let assigned = repo.add_member(member).await?;
            ui::success(&format!("Added member {}", assigned));
        }

        Commands::UpdateMember { id, fields, clear_image } => {
            let Some(existing) = repo.get_member(id).await? else {
                anyhow::bail!("No member with id {}", id);
            };
            let mut member = fields.apply(existing)?;
            if clear_image {
                member.image_bytes = None;
            }
            repo.update_member(member).await?;
            ui::success(&format!("Updated member {}", id));
        }

        Commands::AddInterest { name, field, stage } => {
            let assigned = repo.add_interest(Interest::new(name, field, stage)).await?;
            ui::success(&format!("Added interest {}", assigned));
        }

        Commands::Watch { group } => {
            let (a, b) = group.fields();
            let mut academics = repo.academics(a, b);
            println!("{} Watching academics of the {} group...", Icons::EYE, group.title());
            loop {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => break,
                    next = academics.next() => match next {
                        Some(result) => {
                            let members = result?;
                            ui::section(&format!("{} academics", members.len()));
                            println!("{}", ui::member_table(&members));
                        }
                        None => break,
                    },
                }
            }
        }
    }

    Ok(())
}
