//! `tp show` command - display a single entity
//!
//! Prints the entity's name, a byline, its state and its description, and
//! optionally the threaded comments.

use std::collections::BTreeMap;
use std::io::IsTerminal;
use std::sync::LazyLock;

use console::{measure_text_width, style, Term};
use regex::Regex;

use crate::api::client::subdomain;
use crate::api::{entity_url, ApiError, Credentials, SearchService, TpClient};
use crate::cli::commands::{load_config, CommandError};
use crate::cli::output::{self, to_json};
use crate::cli::GlobalOpts;
use crate::core::config::{ConfigError, EffectiveOptions, Overrides};
use crate::core::record::{EntityRecord, Value};
use crate::core::template::{service_timestamp, FieldTemplate, ValueFormat};

const COMMAND: &str = "show";

/// Attribute paths fetched for the detail view
const INCLUDE: &[&str] = &[
    "Comments.CreateDate",
    "Comments.Description",
    "Comments.Id",
    "Comments.Owner",
    "Comments.ParentId",
    "CreateDate",
    "Description",
    "EntityState.Name",
    "EntityType.Name",
    "Id",
    "LastStateChangeDate",
    "Name",
    "Owner.FirstName",
    "Owner.LastName",
];

const BYLINE: &str = "{EntityType.Name} #{Id} by {Owner.Name} on {CreateDate}";
const COMMENT_HEADER: &str = "{Owner.Name} on {CreateDate}";

static EMPTY_DIV: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<div>(?:\s|\u{a0}|&nbsp;)*</div>").expect("valid div pattern"));
static MENTION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<span data-mention="[\w@.]+">([\w\s]+)</span>"#).expect("valid mention pattern")
});
static LINE_BREAK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)<br\s*/?>|</div>|</p>|</li>|</h[1-6]>").expect("valid break pattern")
});
static TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").expect("valid tag pattern"));

#[derive(clap::Args, Debug, Default)]
pub struct ShowArgs {
    /// Entity id
    pub id: u64,

    /// Print the comment thread
    #[arg(long, overrides_with = "no_comments")]
    pub comments: bool,

    /// Do not print comments
    #[arg(long, overrides_with = "comments")]
    pub no_comments: bool,

    /// Print the raw entity as JSON
    #[arg(long, short = 'j')]
    pub json: bool,

    /// Print the entity's web URL and exit
    #[arg(long, short = 'u')]
    pub url: bool,

    /// Override any option for this invocation
    #[arg(long = "set", value_name = "OPTION=VALUE")]
    pub set: Vec<String>,
}

impl ShowArgs {
    pub fn overrides(&self) -> Result<Overrides, ConfigError> {
        let comments = match (self.comments, self.no_comments) {
            (true, _) => Some(true),
            (_, true) => Some(false),
            _ => None,
        };
        Ok(Overrides::new()
            .assignments(&self.set)?
            .set_opt("comments", comments))
    }
}

/// Fetch entity `id`, warning when the id is ambiguous
pub fn fetch(service: &dyn SearchService, id: u64) -> Result<EntityRecord, ApiError> {
    let include: Vec<String> = INCLUDE.iter().map(|s| s.to_string()).collect();
    let mut records = service.find_by_id(id, &include)?;

    if records.len() > 1 {
        eprintln!(
            "{}",
            style(format!(
                "Id {} matches {} entities, showing the first",
                id,
                records.len()
            ))
            .yellow()
        );
    }

    if records.is_empty() {
        return Err(ApiError::NotFound(id));
    }
    Ok(records.swap_remove(0))
}

/// Render the detail view for `record` within `width` columns
pub fn render(record: &EntityRecord, options: &EffectiveOptions, width: usize) -> String {
    let format = ValueFormat::new(&options.date);
    let text = |template: &str| FieldTemplate::compile(template).resolve(record, &format);

    let mut out = String::from("\n");
    out.push_str(&format!("{}\n", style(text("{Name}")).bold().underlined()));
    out.push_str(&format!("{}\n", text(BYLINE)));
    out.push_str(&format!(
        "{} as of {}\n\n",
        style(text("{EntityState.Name}")).bold(),
        text("{LastStateChangeDate}")
    ));

    let description = record
        .get("Description")
        .and_then(Value::as_str)
        .map(html_to_text)
        .unwrap_or_default();
    out.push_str(&fill(&description, width, options.indent));
    out.push('\n');

    if options.comments {
        let comments = comment_list(record);
        Thread::new(&comments).render(options.indent * 2, options.indent, width, &format, &mut out);
    }

    out
}

/// Comments of `record`, oldest first
fn comment_list(record: &EntityRecord) -> Vec<&EntityRecord> {
    let items = match record.get("Comments") {
        Some(Value::Record(comments)) => comments.get("Items").and_then(Value::as_list),
        Some(Value::List(items)) => Some(items.as_slice()),
        _ => None,
    };

    let mut comments: Vec<&EntityRecord> = items
        .unwrap_or_default()
        .iter()
        .filter_map(Value::as_record)
        .collect();
    comments.sort_by_key(|c| {
        c.get("CreateDate")
            .and_then(Value::as_str)
            .and_then(service_timestamp)
    });
    comments
}

/// Comments grouped by parent id
struct Thread<'a> {
    comments: &'a [&'a EntityRecord],
    children: BTreeMap<u64, Vec<usize>>,
}

impl<'a> Thread<'a> {
    fn new(comments: &'a [&'a EntityRecord]) -> Self {
        let ids: Vec<Option<u64>> = comments.iter().map(|c| c.id()).collect();
        let mut children: BTreeMap<u64, Vec<usize>> = BTreeMap::new();
        for (index, comment) in comments.iter().enumerate() {
            if let Some(parent) = parent_id(comment).filter(|p| ids.contains(&Some(*p))) {
                children.entry(parent).or_default().push(index);
            }
        }
        Self { comments, children }
    }

    /// Comments without a parent in this thread
    fn roots(&self) -> Vec<usize> {
        let ids: Vec<Option<u64>> = self.comments.iter().map(|c| c.id()).collect();
        (0..self.comments.len())
            .filter(|&i| {
                parent_id(self.comments[i]).map_or(true, |p| !ids.contains(&Some(p)))
            })
            .collect()
    }

    /// Render every comment once, replies under their parents
    ///
    /// Comments only reachable through a parent cycle are shown as roots.
    fn render(
        &self,
        indent: usize,
        step: usize,
        width: usize,
        format: &ValueFormat,
        out: &mut String,
    ) {
        let mut seen = vec![false; self.comments.len()];
        for root in self.roots() {
            self.render_comment(root, indent, step, width, format, &mut seen, out);
        }
        for index in 0..self.comments.len() {
            if !seen[index] {
                self.render_comment(index, indent, step, width, format, &mut seen, out);
            }
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn render_comment(
        &self,
        index: usize,
        indent: usize,
        step: usize,
        width: usize,
        format: &ValueFormat,
        seen: &mut [bool],
        out: &mut String,
    ) {
        seen[index] = true;
        let comment = self.comments[index];
        let header = FieldTemplate::compile(COMMENT_HEADER).resolve(comment, format);
        out.push_str(&format!(
            "\n{}{}\n",
            " ".repeat(indent),
            style(header).bold().underlined()
        ));

        let body = comment
            .get("Description")
            .and_then(Value::as_str)
            .map(html_to_text)
            .unwrap_or_default();
        out.push_str(&fill(&body, width, indent + step));
        out.push('\n');

        let children = comment
            .id()
            .and_then(|id| self.children.get(&id))
            .map(Vec::as_slice)
            .unwrap_or_default();
        for &child in children {
            if !seen[child] {
                self.render_comment(child, indent + step, step, width, format, seen, out);
            }
        }
    }
}

fn parent_id(comment: &EntityRecord) -> Option<u64> {
    match comment.get("ParentId")? {
        Value::Number(n) => n.as_u64(),
        _ => None,
    }
}

/// Convert a rich-text description to plain text
pub fn html_to_text(html: &str) -> String {
    let text = MENTION.replace_all(html, "@$1");
    let text = EMPTY_DIV.replace_all(&text, "");
    let text = LINE_BREAK.replace_all(&text, "\n");
    let text = TAG.replace_all(&text, "");

    let text = text
        .replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&");

    text.lines()
        .map(str::trim_end)
        .collect::<Vec<_>>()
        .join("\n")
        .trim_matches('\n')
        .to_string()
}

/// Wrap each paragraph to `width` columns and indent every line
pub fn fill(text: &str, width: usize, indent: usize) -> String {
    let prefix = " ".repeat(indent);
    let width = width.saturating_sub(indent).max(1);

    text.split('\n')
        .flat_map(|paragraph| wrap(paragraph, width))
        .map(|line| {
            if line.is_empty() {
                line
            } else {
                format!("{}{}", prefix, line)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn wrap(paragraph: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut line = String::new();

    for word in paragraph.split_whitespace() {
        if !line.is_empty() && measure_text_width(&line) + 1 + measure_text_width(word) > width {
            lines.push(std::mem::take(&mut line));
        }
        if !line.is_empty() {
            line.push(' ');
        }
        line.push_str(word);
    }

    lines.push(line);
    lines
}

/// Text width used for descriptions, based on the terminal size
fn output_width() -> usize {
    let (_, columns) = Term::stdout().size();
    let columns = columns as usize;
    columns.saturating_sub(20).max(columns.min(80)).min(130)
}

/// Run the show command
pub fn run(args: ShowArgs, global: &GlobalOpts) -> Result<(), CommandError> {
    let files = load_config(global)?;
    let options = EffectiveOptions::resolve(COMMAND, &args.overrides()?, &files)?;

    if args.url {
        let subdomain = subdomain(&files, std::io::stdin().is_terminal())?;
        output::print(&format!("{}\n", entity_url(&subdomain, args.id)))?;
        return Ok(());
    }

    let client = TpClient::new(Credentials::from_config(&files)?)?;
    let record = fetch(&client, args.id)?;

    let text = if args.json {
        format!("{}\n", to_json(&record, options.indent)?)
    } else {
        render(&record, &options, output_width())
    };

    output::emit(&text, options.pager && !args.json)?;
    Ok(())
}
