//! `tp ls` command - list entities matching a filter
//!
//! Options are resolved and the filter parsed before any credentials are
//! read, so configuration mistakes never reach the network.

use crate::api::{Credentials, SearchService, TpClient};
use crate::cli::args::PagerArgs;
use crate::cli::commands::{load_config, CommandError};
use crate::cli::output::{self, to_json};
use crate::cli::table::{TableFormatter, TableStyle};
use crate::cli::GlobalOpts;
use crate::core::config::{ConfigError, EffectiveOptions, FileConfig, Overrides};
use crate::core::entity::EntityTypes;
use crate::core::filter::{FilterParser, ParsedFilter};
use crate::core::query::QueryBuilder;
use crate::core::template::{FieldTemplate, ValueFormat};

const COMMAND: &str = "ls";

#[derive(clap::Args, Debug, Default)]
pub struct LsArgs {
    /// Entity types, template names, field=value, field:text, +tag or plain words
    #[arg(value_name = "FILTER")]
    pub filter: Vec<String>,

    /// Number of entities to list
    #[arg(long, short = 'n')]
    pub number: Option<u32>,

    /// Number of entities to skip
    #[arg(long, short = 'o')]
    pub offset: Option<u32>,

    /// Field to sort by
    #[arg(long, short = 's')]
    pub sort: Option<String>,

    /// Sort in descending order
    #[arg(long, short = 'r')]
    pub reverse: bool,

    /// Table style (tp_table, plain, simple, pipe)
    #[arg(long, short = 't')]
    pub table: Option<String>,

    /// Print the fetched entities as JSON
    #[arg(long, short = 'j')]
    pub json: bool,

    #[command(flatten)]
    pub pager: PagerArgs,

    /// Override any option for this invocation
    #[arg(long = "set", value_name = "OPTION=VALUE")]
    pub set: Vec<String>,
}

impl LsArgs {
    /// Command-line option values; dedicated flags win over `--set`
    pub fn overrides(&self) -> Result<Overrides, ConfigError> {
        Ok(Overrides::new()
            .assignments(&self.set)?
            .set_opt("number", self.number)
            .set_opt("offset", self.offset)
            .set_opt("sort", self.sort.as_ref())
            .set_opt("reverse", self.reverse.then_some(true))
            .set_opt("table", self.table.as_ref())
            .set_opt("pager", self.pager.value()))
    }
}

/// A validated listing, ready to be sent to the service
#[derive(Debug)]
pub struct ListPlan {
    pub options: EffectiveOptions,
    pub filter: ParsedFilter,
    pub style: TableStyle,
}

/// Resolve options and parse the filter tokens
///
/// A template token switches option resolution to its `[ls.<name>]` section.
/// A bare number sets the page size unless `--number` or `--set` already did.
pub fn plan<S: AsRef<str>>(
    tokens: &[S],
    overrides: &Overrides,
    files: &FileConfig,
) -> Result<ListPlan, ConfigError> {
    let base = EffectiveOptions::resolve(COMMAND, overrides, files)?;
    let types = EntityTypes::new(base.known_types());
    let filter = FilterParser::new(&types)
        .with_templates(files.templates(COMMAND))
        .parse(tokens);

    let section = match filter.templates.as_slice() {
        [] => COMMAND.to_string(),
        [name] => {
            tracing::debug!(template = %name, "using template");
            format!("{}.{}", COMMAND, name)
        }
        names => return Err(ConfigError::MultipleTemplates(names.join(", "))),
    };

    let page_size = match filter.numbers.as_slice() {
        [] => None,
        [number] => Some(*number),
        numbers => {
            let numbers: Vec<String> = numbers.iter().map(u32::to_string).collect();
            return Err(ConfigError::MultipleNumbers(numbers.join(", ")));
        }
    };

    let options = match page_size {
        Some(number) if overrides.get("number").is_none() => {
            let overrides = overrides.clone().set("number", number.to_string());
            EffectiveOptions::resolve(&section, &overrides, files)?
        }
        _ if section == COMMAND => base,
        _ => EffectiveOptions::resolve(&section, overrides, files)?,
    };

    let style = options.table.parse()?;
    Ok(ListPlan {
        options,
        filter,
        style,
    })
}

/// Fetch one page and render it as a table or JSON
pub fn list(
    service: &dyn SearchService,
    plan: &ListPlan,
    json: bool,
) -> Result<String, CommandError> {
    let query = QueryBuilder::new(&plan.options).build(&plan.filter);
    let mut records = service.search(&query)?;
    records.truncate(query.limit as usize);
    tracing::info!(count = records.len(), "fetched page");

    if json {
        return Ok(format!("{}\n", to_json(&records, plan.options.indent)?));
    }

    let templates = FieldTemplate::compile_all(&plan.options.fields);
    let format = ValueFormat::new(&plan.options.date);
    let rows: Vec<Vec<String>> = records
        .iter()
        .map(|record| {
            templates
                .iter()
                .map(|template| template.resolve(record, &format))
                .collect()
        })
        .collect();

    let table = TableFormatter::new(&plan.options.headers, plan.style).render(&rows);
    Ok(format!("\n{}\n\n", table))
}

/// Run the ls command
pub fn run(args: LsArgs, global: &GlobalOpts) -> Result<(), CommandError> {
    let files = load_config(global)?;
    let plan = plan(&args.filter, &args.overrides()?, &files)?;

    let client = TpClient::new(Credentials::from_config(&files)?)?;
    let text = list(&client, &plan, args.json)?;

    output::emit(&text, plan.options.pager && !args.json)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;
    use crate::api::memory::MemoryService;
    use crate::api::ApiError;
    use crate::core::record::{EntityRecord, Value};

    fn files(ini: &str) -> FileConfig {
        let mut config = FileConfig::builtin().unwrap();
        config.merge(FileConfig::from_ini(ini, "test.conf").unwrap());
        config
    }

    fn entity(id: u64, kind: &str, name: &str) -> EntityRecord {
        EntityRecord::new()
            .with("Id", id)
            .with("Name", name)
            .with("EntityType", EntityRecord::new().with("Name", kind))
    }

    fn five_bugs() -> MemoryService {
        MemoryService::new((1..=5).map(|id| entity(id, "Bug", "Crash")).collect())
    }

    const ID_NAME: &str = "[ls]\nfields = {Id}, {Name}\nheaders = Id, Name\n";

    #[test]
    fn test_single_record_table() {
        let service = MemoryService::new(vec![entity(18928, "Task", "User login")]);
        let plan = plan(&[] as &[&str], &Overrides::new(), &files(ID_NAME)).unwrap();

        assert_eq!(
            list(&service, &plan, false).unwrap(),
            "\n   Id  Name\n─────  ──────────\n18928  User login\n\n"
        );
    }

    #[test]
    fn test_page_size_and_offset() {
        let service = five_bugs();
        let overrides = Overrides::new().set("number", "2").set("offset", "0");
        let page = list(&service, &plan(&["bug"], &overrides, &files(ID_NAME)).unwrap(), false)
            .unwrap();
        assert_eq!(page.lines().filter(|l| l.ends_with("Crash")).count(), 2);

        let overrides = Overrides::new().set("number", "2").set("offset", "10");
        let page = list(&service, &plan(&["bug"], &overrides, &files(ID_NAME)).unwrap(), false)
            .unwrap();
        assert_eq!(page, "\nId  Name\n──  ────\n\n");
    }

    #[test]
    fn test_query_sent_to_service() {
        let service = five_bugs();
        let plan = plan(&["task", "bug", "state=open"], &Overrides::new(), &files("")).unwrap();
        list(&service, &plan, false).unwrap();

        let queries = service.queries();
        assert_eq!(queries.len(), 1);
        assert_eq!(
            queries[0].entity_types,
            BTreeSet::from(["Bug".to_string(), "Task".to_string()])
        );
        assert_eq!(queries[0].limit, 25);
        assert_eq!(queries[0].filters.len(), 1);
    }

    #[test]
    fn test_null_owner_renders_blank() {
        let record = entity(3, "Bug", "Crash").with("Owner", Value::Null);
        let service = MemoryService::new(vec![record]);
        let config = files(
            "[ls]\nfields = {Id}, {Owner.FirstName} {Owner.LastName}\nheaders = Id, Owner\n",
        );
        let text = list(&service, &plan(&[] as &[&str], &Overrides::new(), &config).unwrap(), false)
            .unwrap();

        assert!(text.contains("\n 3\n"), "{:?}", text);
    }

    #[test]
    fn test_template_selects_section() {
        let config = files("[ls.mine]\nnumber = 1\nfilter = owner=ada\n");
        let plan = plan(&["mine"], &Overrides::new(), &config).unwrap();

        assert_eq!(plan.options.command, "ls.mine");
        assert_eq!(plan.options.number, 1);

        let service = five_bugs();
        list(&service, &plan, false).unwrap();
        assert_eq!(service.queries()[0].filters[0].field, "owner");
    }

    #[test]
    fn test_multiple_templates_rejected() {
        let config = files("[ls.mine]\nnumber = 1\n[ls.open]\nnumber = 2\n");
        assert!(matches!(
            plan(&["mine", "open"], &Overrides::new(), &config),
            Err(ConfigError::MultipleTemplates(_))
        ));
    }

    #[test]
    fn test_bare_number_sets_page_size() {
        let config = files("[ls.mine]\nnumber = 1\nsort = Name\n");

        let listing = plan(&["bug", "3"], &Overrides::new(), &config).unwrap();
        assert_eq!(listing.options.number, 3);
        assert!(listing.filter.filters.is_empty());

        // beats the template section, loses to the command line
        let listing = plan(&["mine", "3"], &Overrides::new(), &config).unwrap();
        assert_eq!(listing.options.number, 3);
        assert_eq!(listing.options.sort, "Name");

        let overrides = Overrides::new().set("number", "7");
        let listing = plan(&["3"], &overrides, &config).unwrap();
        assert_eq!(listing.options.number, 7);

        let service = five_bugs();
        let listing = plan(&["bug", "2"], &Overrides::new(), &files(ID_NAME)).unwrap();
        list(&service, &listing, false).unwrap();
        assert_eq!(service.queries()[0].limit, 2);
    }

    #[test]
    fn test_multiple_numbers_rejected() {
        let err = plan(&["3", "bug", "4"], &Overrides::new(), &files("")).unwrap_err();
        assert!(matches!(err, ConfigError::MultipleNumbers(_)));
        assert_eq!(err.to_string(), "More than one number in the filter: 3, 4");
    }

    #[test]
    fn test_configuration_errors_precede_queries() {
        let overrides = Overrides::new().set("table", "fancy_grid");
        assert!(matches!(
            plan(&["bug"], &overrides, &files("")),
            Err(ConfigError::UnknownTableStyle(_))
        ));

        let mismatch = files("[ls]\nfields = {Id}, {Name}\nheaders = Id\n");
        assert!(matches!(
            plan(&["bug"], &Overrides::new(), &mismatch),
            Err(ConfigError::FieldHeaderMismatch { .. })
        ));
    }

    #[test]
    fn test_remote_failure_prints_nothing() {
        let service = MemoryService::failing("BadRequest", "Unknown field 'colour'");
        let plan = plan(&["colour=red"], &Overrides::new(), &files("")).unwrap();

        let err = list(&service, &plan, false).unwrap_err();
        assert!(matches!(err, CommandError::Api(ApiError::Status { .. })));
        assert_eq!(err.exit_code(), 1);
        assert_eq!(err.to_string(), "BadRequest: Unknown field 'colour'");
    }

    #[test]
    fn test_json_output() {
        let service = MemoryService::new(vec![entity(7, "Bug", "Crash")]);
        let plan = plan(&[] as &[&str], &Overrides::new().set("indent", "2"), &files("")).unwrap();
        let text = list(&service, &plan, true).unwrap();

        let parsed: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed[0]["Id"], 7);
        assert!(text.contains("\n  {\n    \""));
    }

    #[test]
    fn test_dedicated_flags_beat_set() {
        let args = LsArgs {
            number: Some(3),
            set: vec!["number=9".to_string(), "sort=Name".to_string()],
            ..LsArgs::default()
        };
        let overrides = args.overrides().unwrap();

        assert_eq!(overrides.get("number"), Some("3"));
        assert_eq!(overrides.get("sort"), Some("Name"));
        assert_eq!(overrides.get("reverse"), None);
    }
}
