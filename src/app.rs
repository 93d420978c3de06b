use clap::{error::ErrorKind, Parser};
use futures::future::{FutureExt, LocalBoxFuture};
use futures::stream::FuturesUnordered;
use futures::StreamExt;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::catalog::SortKey;
use crate::cli::args::CliArgs;
use crate::cli::command::{self, Command};
use crate::cli::validation;
use crate::config::{self, ConfigFile};
use crate::output::{self, OutputFormat, RenderSink, WriterSink};
use crate::session::{self, FilterFetch, FilterRequest, PageFetch, Session, SessionOptions};
use crate::source::{CatalogSource, HttpCatalog, HttpCatalogOptions};
use crate::utils;

fn print_banner() {
    const BANNER: &str = r#"
       __
  ____/ /__  _  ___   __(_)__ _      __
 / __  / _ \| |/_/ | / / / _ \ | /| / /
/ /_/ /  __/>  < | |/ / /  __/ |/ |/ /
\__,_/\___/_/|_| |___/_/\___/|__/|__/
"#;
    println!("{}", BANNER);
    println!("       v{} - catalog viewer\n", env!("CARGO_PKG_VERSION"));
}

fn format_kv_line(label: &str, value: &str) {
    println!(":: {:<10}: {}", label, value);
}

#[derive(Clone, Debug)]
struct InitialView {
    search: Option<String>,
    filter: Option<String>,
    sort: Option<SortKey>,
    page: Option<usize>,
}

#[derive(Clone, Debug)]
struct RunConfig {
    no_color: bool,
    output_format: OutputFormat,
    once: bool,
    sprite_base: String,
    http: HttpCatalogOptions,
    session: SessionOptions,
    initial: InitialView,
}

fn build_run_config(args: CliArgs, cfg: ConfigFile) -> Result<RunConfig, String> {
    validation::validate(&args)?;

    let no_color = if args.color {
        false
    } else {
        args.no_color || cfg.no_color.unwrap_or(false)
    };

    let output_format_raw = args
        .output_format
        .or(cfg.output_format)
        .unwrap_or_else(|| "text".to_string());
    let output_format = OutputFormat::parse(&output_format_raw)
        .ok_or_else(|| format!("invalid output format '{output_format_raw}'"))?;

    let sort = match args.sort.or(cfg.sort) {
        Some(raw) => Some(
            SortKey::parse(&raw).ok_or_else(|| format!("invalid sort key '{raw}'"))?,
        ),
        None => None,
    };

    let page_size = args
        .page_size
        .or(cfg.page_size)
        .unwrap_or(crate::controller::DEFAULT_PAGE_SIZE);
    if page_size == 0 {
        return Err("invalid page_size, expected positive integer".to_string());
    }
    let concurrency = args.concurrency.or(cfg.concurrency).unwrap_or(12);
    if concurrency == 0 {
        return Err("invalid concurrency, expected positive integer".to_string());
    }
    let rate = args.rate.or(cfg.rate).unwrap_or(50);
    if rate == 0 {
        return Err("invalid rate, expected positive integer".to_string());
    }
    let timeout = args.timeout.or(cfg.timeout).unwrap_or(10);
    if timeout == 0 {
        return Err("invalid timeout, expected positive integer".to_string());
    }

    let api_base = args
        .api_base
        .or(cfg.api_base)
        .unwrap_or_else(|| utils::DEFAULT_API_BASE.to_string());
    reqwest::Url::parse(&api_base).map_err(|e| format!("invalid api base '{api_base}': {e}"))?;
    let sprite_base = args
        .sprite_base
        .or(cfg.sprite_base)
        .unwrap_or_else(|| utils::DEFAULT_SPRITE_BASE.to_string());

    let proxy = args.proxy.or(cfg.proxy).filter(|p| !p.trim().is_empty());

    let search = args.search.filter(|s| !s.trim().is_empty());
    let filter = args.filter.filter(|s| !s.trim().is_empty());

    Ok(RunConfig {
        no_color,
        output_format,
        once: args.once,
        sprite_base,
        http: HttpCatalogOptions {
            api_base,
            list_limit: args
                .list_limit
                .or(cfg.list_limit)
                .unwrap_or(utils::DEFAULT_LIST_LIMIT),
            max_id: args.max_id.or(cfg.max_id).unwrap_or(utils::DEFAULT_MAX_ID),
            rate,
            timeout_seconds: timeout,
            proxy,
        },
        session: SessionOptions {
            page_size,
            concurrency,
        },
        initial: InitialView {
            search,
            filter,
            sort,
            page: args.page,
        },
    })
}

fn init_logging(verbose: u8) {
    let default_directive = match verbose {
        0 => "dexview=warn",
        1 => "dexview=info",
        _ => "dexview=debug",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

async fn apply_initial_view<S: CatalogSource>(session: &mut Session<S>, initial: &InitialView) {
    if let Some(key) = initial.sort {
        session.sort(key);
    }
    if let Some(term) = initial.search.as_deref() {
        session.search(term);
    }
    if let Some(category) = initial.filter.as_deref() {
        let pb = utils::spinner(&format!("loading every detail record for type {category}..."));
        session.filter(Some(category)).await;
        pb.finish_and_clear();
    }
    if let Some(page) = initial.page {
        session.navigate(crate::controller::Navigation::GoTo(page));
    }
}

// a load running in the background of the prompt
enum Loaded {
    Page(PageFetch),
    Filter(FilterFetch),
}

type Load = LocalBoxFuture<'static, Loaded>;

fn queue_page<S: CatalogSource + 'static>(session: &Session<S>) -> Load {
    session::fetch_page(session.source(), session.begin_page(), session.limit())
        .map(Loaded::Page)
        .boxed_local()
}

fn queue_filter<S: CatalogSource + 'static>(session: &Session<S>, request: FilterRequest) -> Load {
    session::fetch_filter(session.source(), request, session.limit())
        .map(Loaded::Filter)
        .boxed_local()
}

// returns the load a command starts, if any
async fn handle_command<S: CatalogSource + 'static, R: RenderSink>(
    session: &mut Session<S>,
    sink: &mut R,
    cmd: Command,
) -> Result<Option<Load>, String> {
    let io = |e: std::io::Error| format!("failed to write output: {e}");
    match cmd {
        Command::Search(term) => {
            session.search(&term);
            Ok(Some(queue_page(session)))
        }
        Command::Filter(category) => {
            let request = session.begin_filter(category.as_deref());
            if !request.missing().is_empty() {
                sink.render_notice(&format!(
                    "loading {} detail records...",
                    request.missing().len()
                ))
                .map_err(io)?;
            }
            Ok(Some(queue_filter(session, request)))
        }
        Command::Sort(key) => {
            session.sort(key);
            Ok(Some(queue_page(session)))
        }
        Command::Navigate(navigation) => {
            if session.navigate(navigation) {
                Ok(Some(queue_page(session)))
            } else {
                Ok(None)
            }
        }
        Command::GoTo(raw) => match session.go_to_input(&raw) {
            Ok(true) => Ok(Some(queue_page(session))),
            Ok(false) => Ok(None),
            Err(current) => {
                let total = session.controller().total_pages();
                sink.render_notice(&format!(
                    "page must be between 1 and {total}, staying on page {current}"
                ))
                .map_err(io)?;
                Ok(None)
            }
        },
        Command::Page => Ok(Some(queue_page(session))),
        Command::Show(query) => {
            match session.inspect(&query).await {
                Ok((summary, detail)) => sink.render_detail(&summary, &detail).map_err(io)?,
                Err(e) => sink.render_notice(&output::describe_error(&e)).map_err(io)?,
            }
            Ok(None)
        }
        Command::Types => {
            let categories = session.categories();
            let message = if categories.is_empty() {
                "no types loaded yet, page through the catalog or use `filter`".to_string()
            } else {
                categories.join(", ")
            };
            sink.render_notice(&message).map_err(io)?;
            Ok(None)
        }
        Command::Help => {
            sink.render_notice(command::HELP).map_err(io)?;
            Ok(None)
        }
        Command::Quit => Ok(None),
    }
}

// renders a finished load; a committed filter asks for its first page
fn settle<S: CatalogSource + 'static, R: RenderSink>(
    session: &mut Session<S>,
    sink: &mut R,
    loaded: Loaded,
) -> Result<Option<Load>, String> {
    match loaded {
        Loaded::Page(fetch) => {
            if let Some(view) = session.commit_page(fetch) {
                sink.render_page(&view)
                    .map_err(|e| format!("failed to write output: {e}"))?;
            }
            Ok(None)
        }
        Loaded::Filter(fetch) => match session.commit_filter(fetch) {
            Some(_) => Ok(Some(queue_page(session))),
            None => Ok(None),
        },
    }
}

async fn run_async(run: RunConfig) -> Result<(), String> {
    if run.no_color {
        colored::control::set_override(false);
    }
    let interactive_text = run.output_format == OutputFormat::Text && !run.once;
    if interactive_text {
        print_banner();
        format_kv_line("API", &run.http.api_base);
        format_kv_line("Page size", &run.session.page_size.to_string());
        let requests = format!(
            "{} in flight, {}/s",
            run.session.concurrency, run.http.rate
        );
        format_kv_line("Requests", &requests);
        println!();
    }

    let source = HttpCatalog::new(&run.http).map_err(|e| e.to_string())?;
    let mut session = Session::new(source, run.session.clone()).map_err(|e| e.to_string())?;

    let pb = utils::spinner("Pokémons are coming...");
    let loaded = session.load().await;
    pb.finish_and_clear();
    let count = loaded.map_err(|e| {
        error!(error = %e, "catalog list could not be fetched");
        format!("failed to load catalog: {e}")
    })?;
    info!(count, "catalog ready");

    apply_initial_view(&mut session, &run.initial).await;

    let mut sink = WriterSink::new(std::io::stdout(), run.output_format, &run.sprite_base);
    let io = |e: std::io::Error| format!("failed to write output: {e}");

    if run.once {
        if let Some(view) = session.page().await {
            sink.render_page(&view).map_err(io)?;
        }
        return Ok(());
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut loads: FuturesUnordered<Load> = FuturesUnordered::new();
    loads.push(queue_page(&session));

    loop {
        tokio::select! {
            Some(loaded) = loads.next(), if !loads.is_empty() => {
                if let Some(next) = settle(&mut session, &mut sink, loaded)? {
                    loads.push(next);
                }
            }
            line = lines.next_line() => {
                let line = match line {
                    Ok(Some(line)) => line,
                    Ok(None) => break,
                    Err(e) => return Err(format!("failed to read command: {e}")),
                };
                match command::parse_command(&line) {
                    Ok(None) => {}
                    Ok(Some(Command::Quit)) => break,
                    Ok(Some(cmd)) => {
                        if let Some(load) = handle_command(&mut session, &mut sink, cmd).await? {
                            // the newest view replaces anything still loading
                            loads = FuturesUnordered::new();
                            loads.push(load);
                        }
                    }
                    Err(message) => sink.render_notice(&message).map_err(io)?,
                }
            }
        }
    }

    while let Some(loaded) = loads.next().await {
        if let Some(next) = settle(&mut session, &mut sink, loaded)? {
            loads.push(next);
        }
    }
    Ok(())
}

pub fn run_cli() -> Result<(), String> {
    let args = match CliArgs::try_parse() {
        Ok(args) => args,
        Err(e) => match e.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
                print!("{}", e);
                return Ok(());
            }
            _ => return Err(e.to_string()),
        },
    };

    init_logging(args.verbose);

    if args.init_config {
        let path = match args.config.as_deref() {
            Some(p) => config::expand_tilde(p),
            None => config::default_config_path()
                .ok_or_else(|| "could not determine home directory".to_string())?,
        };
        config::ensure_default_config_file(&path)?;
        println!("config written to {}", path.display());
        return Ok(());
    }

    let cfg = match args.config.as_deref() {
        Some(p) => config::load_config(&config::expand_tilde(p), false)?,
        None => match config::default_config_path() {
            Some(path) => config::load_config(&path, true)?,
            None => ConfigFile::default(),
        },
    };

    let run = build_run_config(args, cfg)?;

    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| format!("failed to build runtime: {e}"))?;

    rt.block_on(run_async(run))
}
