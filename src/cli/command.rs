use crate::catalog::SortKey;
use crate::controller::Navigation;

pub const HELP: &str = "\
commands:
  search <term>      match name or id (empty term clears the search)
  filter <type>      show one type only; `filter none` clears it
  sort <key>         id-asc, id-desc, name-asc or name-desc
  first | prev | next | last
  go <page>          jump to a page
  page               render the current page again
  show <id|name>     detail record for one entity
  types              types seen so far
  help | quit";

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    Search(String),
    Filter(Option<String>),
    Sort(SortKey),
    Navigate(Navigation),
    GoTo(String),
    Page,
    Show(String),
    Types,
    Help,
    Quit,
}

/// Parses one prompt line. Blank lines yield `Ok(None)`.
pub fn parse_command(line: &str) -> Result<Option<Command>, String> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    let (head, rest) = match line.split_once(char::is_whitespace) {
        Some((head, rest)) => (head, rest.trim()),
        None => (line, ""),
    };

    let command = match head.to_lowercase().as_str() {
        "search" | "s" | "/" => Command::Search(rest.to_string()),
        "filter" | "f" | "type" => match rest.to_lowercase().as_str() {
            "" | "none" | "all" | "off" => Command::Filter(None),
            _ => Command::Filter(Some(rest.to_string())),
        },
        "sort" | "o" => {
            let key = SortKey::parse(rest).ok_or_else(|| {
                format!("unknown sort key '{rest}', expected id-asc, id-desc, name-asc or name-desc")
            })?;
            Command::Sort(key)
        }
        "first" | "home" => Command::Navigate(Navigation::First),
        "prev" | "previous" | "p" => Command::Navigate(Navigation::Previous),
        "next" | "n" => Command::Navigate(Navigation::Next),
        "last" | "end" => Command::Navigate(Navigation::Last),
        "go" | "g" | "goto" => Command::GoTo(rest.to_string()),
        "page" | "r" | "refresh" => Command::Page,
        "show" | "info" => {
            if rest.is_empty() {
                return Err("show needs an id or a name".to_string());
            }
            Command::Show(rest.to_string())
        }
        "types" | "categories" => Command::Types,
        "help" | "h" | "?" => Command::Help,
        "quit" | "exit" | "q" => Command::Quit,
        other => return Err(format!("unknown command '{other}', try `help`")),
    };
    Ok(Some(command))
}
