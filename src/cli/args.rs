use clap::{ArgAction, Parser};

#[derive(Parser, Debug, Clone)]
#[command(
    name = "dexview",
    version,
    about = "paginated terminal viewer for the PokeAPI catalog",
    long_about = "dexview loads the PokeAPI creature list once and lets you page, search, filter by type and sort it from an interactive prompt.\n\nExamples:\n  dexview\n  dexview --search pika --once\n  dexview --filter fire --sort name-desc\n  dexview --format json --page 3 --once\n\nTip: Use --config to persist settings and keep CLI invocations short."
)]
pub struct CliArgs {
    #[arg(
        short = 'v',
        long = "vb",
        visible_alias = "verbose",
        action = ArgAction::Count,
        help_heading = "Output",
        help = "Increase log verbosity (-v, -vv)."
    )]
    pub verbose: u8,

    #[arg(
        short = 'c',
        long = "clr",
        visible_alias = "color",
        help_heading = "Output",
        help = "Enable colored output (overrides --no-color)."
    )]
    pub color: bool,

    #[arg(
        long = "nc",
        visible_alias = "no-color",
        help_heading = "Output",
        help = "Disable colored output."
    )]
    pub no_color: bool,

    #[arg(
        short = 'A',
        long = "of",
        visible_aliases = ["output-format", "format"],
        value_name = "FORMAT",
        help_heading = "Output",
        help = "Page output format: text, json or html."
    )]
    pub output_format: Option<String>,

    #[arg(
        long = "once",
        help_heading = "Output",
        help = "Render the initial page and exit instead of starting the prompt."
    )]
    pub once: bool,

    #[arg(
        short = 'C',
        long = "cfg",
        visible_alias = "config",
        value_name = "FILE",
        help_heading = "Input",
        help = "Path to config file (defaults to ~/.dexview/config.yml when it exists)."
    )]
    pub config: Option<String>,

    #[arg(
        long = "init-config",
        help_heading = "Input",
        help = "Write a commented default config file and exit."
    )]
    pub init_config: bool,

    #[arg(
        short = 'a',
        long = "api",
        visible_alias = "api-base",
        value_name = "URL",
        help_heading = "Input",
        help = "Base URL of the catalog API."
    )]
    pub api_base: Option<String>,

    #[arg(
        long = "spr",
        visible_alias = "sprite-base",
        value_name = "URL",
        help_heading = "Input",
        help = "Base URL that sprite images are served from."
    )]
    pub sprite_base: Option<String>,

    #[arg(
        short = 'l',
        long = "lim",
        visible_alias = "list-limit",
        value_name = "N",
        help_heading = "Input",
        help = "Number of entries requested from the list endpoint."
    )]
    pub list_limit: Option<u32>,

    #[arg(
        long = "mid",
        visible_alias = "max-id",
        value_name = "ID",
        help_heading = "Input",
        help = "Skip entries whose id is at or above this value."
    )]
    pub max_id: Option<u32>,

    #[arg(
        short = 's',
        long = "q",
        visible_alias = "search",
        value_name = "TERM",
        help_heading = "View",
        help = "Start with a search on name or id."
    )]
    pub search: Option<String>,

    #[arg(
        short = 'f',
        long = "ft",
        visible_alias = "filter",
        value_name = "TYPE",
        help_heading = "View",
        help = "Start filtered to one type (fetches every detail record)."
    )]
    pub filter: Option<String>,

    #[arg(
        short = 'o',
        long = "srt",
        visible_alias = "sort",
        value_name = "KEY",
        help_heading = "View",
        help = "Sort order: id-asc, id-desc, name-asc or name-desc."
    )]
    pub sort: Option<String>,

    #[arg(
        short = 'g',
        long = "pg",
        visible_alias = "page",
        value_name = "N",
        help_heading = "View",
        help = "Start on this page (clamped to the available range)."
    )]
    pub page: Option<usize>,

    #[arg(
        short = 'n',
        long = "ps",
        visible_alias = "page-size",
        value_name = "N",
        help_heading = "View",
        help = "Cards per page."
    )]
    pub page_size: Option<usize>,

    #[arg(
        short = 't',
        long = "cnc",
        visible_alias = "concurrency",
        value_name = "N",
        help_heading = "Performance",
        help = "Maximum detail requests in flight."
    )]
    pub concurrency: Option<usize>,

    #[arg(
        short = 'r',
        long = "rt",
        visible_alias = "rate",
        value_name = "RPS",
        help_heading = "Performance",
        help = "Request rate limit (requests per second)."
    )]
    pub rate: Option<u32>,

    #[arg(
        short = 'T',
        long = "to",
        visible_alias = "timeout",
        value_name = "SECONDS",
        help_heading = "Performance",
        help = "Per-request timeout in seconds."
    )]
    pub timeout: Option<u64>,

    #[arg(
        short = 'p',
        long = "px",
        visible_alias = "proxy",
        value_name = "URL",
        help_heading = "HTTP",
        help = "Send requests through this proxy."
    )]
    pub proxy: Option<String>,
}
