use crate::catalog::SortKey;
use crate::cli::args::CliArgs;
use crate::output::OutputFormat;

pub fn validate(args: &CliArgs) -> Result<(), String> {
    if args.page_size == Some(0) {
        return Err("invalid page-size, expected positive integer".to_string());
    }
    if args.concurrency == Some(0) {
        return Err("invalid concurrency, expected positive integer".to_string());
    }
    if args.rate == Some(0) {
        return Err("invalid rate, expected positive integer".to_string());
    }
    if args.timeout == Some(0) {
        return Err("invalid timeout, expected positive integer".to_string());
    }
    if args.page == Some(0) {
        return Err("invalid page, pages start at 1".to_string());
    }
    if let Some(raw) = args.sort.as_deref() {
        if SortKey::parse(raw).is_none() {
            return Err(format!(
                "invalid --sort '{raw}', expected id-asc, id-desc, name-asc or name-desc"
            ));
        }
    }
    if let Some(raw) = args.output_format.as_deref() {
        if OutputFormat::parse(raw).is_none() {
            return Err(format!(
                "invalid --output-format '{raw}', expected text, json or html"
            ));
        }
    }
    if args.search.is_some() && args.filter.is_some() {
        return Err("use either --search or --filter, not both".to_string());
    }
    Ok(())
}
