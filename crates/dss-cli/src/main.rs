use std::fs::File;
use std::path::PathBuf;
use std::{env, io};

use chrono::NaiveDate;
use clap::{CommandFactory, Parser};
use clap_complete::{generate, Shell};
use dss_core::{MarkupWriter, OutputCapabilities, Scrapable, ScraperBase, Settings, TabularWriter};
use dss_sites::{ChartRange, ContributionsScraper, Hot100Scraper, InfoboxScraper, PageScraper};

/// Dataset Site Scrapers
#[derive(Debug, Parser)]
#[clap(version)]
pub struct Args {
    #[clap(subcommand)]
    pub cmd: SubCommand,
    /// Optional yaml settings file
    #[clap(env = "DSS_CONFIG", parse(from_os_str), long, global = true)]
    pub config: Option<PathBuf>,
    /// Override the folder datasets are written to
    #[clap(parse(from_os_str), long, global = true)]
    pub output_folder: Option<PathBuf>,
    /// Override the delay in seconds between two requests
    #[clap(long, global = true)]
    pub delay: Option<f64>,
    /// Override the user agent
    #[clap(long, global = true)]
    pub user_agent: Option<String>,
    /// When quiet no logs are outputted
    #[clap(long, short, global = true)]
    pub quiet: bool,
}

#[derive(Debug, clap::Subcommand)]
pub enum SubCommand {
    #[clap(name = "hot100")]
    Hot100(Hot100Args),
    #[clap(name = "infobox")]
    Infobox(InfoboxArgs),
    #[clap(name = "contributions")]
    Contributions(ContributionsArgs),
    #[clap(name = "page")]
    Page(PageArgs),
    #[clap(name = "robots")]
    Robots(RobotsArgs),
    #[clap(hide = true)]
    Completion,
}

/// Collect Billboard Hot 100 charts, most recent week first
#[derive(Debug, clap::Args)]
pub struct Hot100Args {
    /// Oldest week to collect (YYYY-MM-DD)
    #[clap(long)]
    pub from: NaiveDate,
    /// Most recent week to collect, today by default (YYYY-MM-DD)
    #[clap(long)]
    pub to: Option<NaiveDate>,
    /// Dataset file name, its extension selects the format
    #[clap(long, short, default_value = "hot100")]
    pub output_file: String,
}

/// Collect Wikipedia infobox entries of some topics
#[derive(Debug, clap::Args)]
pub struct InfoboxArgs {
    #[clap(required = true)]
    pub topics: Vec<String>,
    /// Dataset file name, its extension selects the format
    #[clap(long, short, default_value = "infobox")]
    pub output_file: String,
}

/// Collect daily GitHub contributions of some users
#[derive(Debug, clap::Args)]
pub struct ContributionsArgs {
    #[clap(required = true)]
    pub users: Vec<String>,
    /// Dataset file name, its extension selects the format
    #[clap(long, short, default_value = "contributions")]
    pub output_file: String,
}

/// Save the raw markup of a single page
#[derive(Debug, clap::Args)]
pub struct PageArgs {
    /// Site the page belongs to
    #[clap(long)]
    pub base_url: String,
    /// Path of the page on the site
    pub path: String,
    #[clap(long, short, default_value = "page")]
    pub output_file: String,
}

/// Print the robots.txt of a site
#[derive(Debug, clap::Args)]
pub struct RobotsArgs {
    pub url: String,
}

impl TryFrom<&Args> for Settings {
    type Error = anyhow::Error;

    fn try_from(args: &Args) -> Result<Self, Self::Error> {
        let mut settings = if let Some(file) = args.config.as_ref().map(File::open) {
            serde_yaml::from_reader(file?)?
        } else {
            Settings::default()
        };
        if let Some(output_folder) = &args.output_folder {
            settings.output_folder = output_folder.clone();
        }
        if let Some(delay) = args.delay {
            settings.crawl_delay = delay;
        }
        if let Some(user_agent) = &args.user_agent {
            settings.user_agent = user_agent.to_string();
        }
        Ok(settings)
    }
}

pub fn hot100(settings: &Settings, args: Hot100Args) -> anyhow::Result<PathBuf> {
    let mut scraper = Hot100Scraper::new(settings)?;
    scraper.scrape(&ChartRange::new(args.from, args.to))?;
    Ok(scraper.write(&args.output_file)?)
}

pub fn infobox(settings: &Settings, args: InfoboxArgs) -> anyhow::Result<PathBuf> {
    let mut scraper = InfoboxScraper::new(settings)?;
    for topic in &args.topics {
        scraper.scrape(topic)?;
    }
    Ok(scraper.write(&args.output_file)?)
}

pub fn contributions(settings: &Settings, args: ContributionsArgs) -> anyhow::Result<PathBuf> {
    let mut scraper = ContributionsScraper::new(settings)?;
    for (i, user) in args.users.iter().enumerate() {
        if i > 0 {
            scraper.data().base().throttle();
        }
        scraper.scrape(user)?;
    }
    Ok(scraper.write(&args.output_file)?)
}

pub fn page(settings: &Settings, args: PageArgs) -> anyhow::Result<PathBuf> {
    let mut scraper = PageScraper::new(&args.base_url, settings)?;
    Ok(scraper.download(&args.path, &args.output_file)?)
}

pub fn robots(settings: &Settings, args: RobotsArgs) -> anyhow::Result<()> {
    let base = ScraperBase::new("robots", &args.url, settings, OutputCapabilities::all())?;
    print!("{}", base.robots_txt());
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    if !args.quiet {
        if env::var_os("RUST_LOG").is_none() {
            env::set_var("RUST_LOG", "dss=info");
        }
        env_logger::init();
    }
    let settings = Settings::try_from(&args)?;

    let written = match args.cmd {
        SubCommand::Hot100(cmd) => hot100(&settings, cmd)?,
        SubCommand::Infobox(cmd) => infobox(&settings, cmd)?,
        SubCommand::Contributions(cmd) => contributions(&settings, cmd)?,
        SubCommand::Page(cmd) => page(&settings, cmd)?,
        SubCommand::Robots(cmd) => return robots(&settings, cmd),
        SubCommand::Completion => {
            generate(Shell::Bash, &mut Args::command(), "dss", &mut io::stdout());
            return Ok(());
        }
    };
    println!("{}", written.display());
    Ok(())
}
