//! Generate or run queries described by model and query files

use super::{
    CliError,
    files::{ModelFile, QueryFile},
    prepare::{PreparedQuery, prepare},
};
use crate::{
    evaluator::Evaluator,
    generator::{CosmosSqlGenerator, SqlGenerator, SqlQuery},
    value::{Value, from_json},
};

/// Options shared by the `sql` and `run` commands
#[derive(Debug, Clone, Default)]
pub struct CommandOptions {
    /// Model file contents (JSON)
    pub model: String,
    /// Query file contents (JSON)
    pub query: String,
    /// Documents to run against: a JSON array or a single object
    pub input: Option<String>,
    /// Pretty-print the output
    pub pretty: bool,
}

fn load(options: &CommandOptions) -> Result<PreparedQuery, CliError> {
    let model_file: ModelFile = serde_json::from_str(&options.model)?;
    let query_file: QueryFile = serde_json::from_str(&options.query)?;
    let model = model_file.into_model()?;
    prepare(&model, query_file)
}

/// Generate query text and bound parameters
pub fn execute_sql(options: &CommandOptions) -> Result<SqlQuery, CliError> {
    let prepared = load(options)?;
    Ok(CosmosSqlGenerator::new().generate(&prepared.select, &prepared.parameters)?)
}

/// Evaluate the query against the input documents and return the matches
pub fn execute_run(options: &CommandOptions) -> Result<Vec<Value>, CliError> {
    let prepared = load(options)?;

    let json_str = options.input.as_ref().ok_or(CliError::NoInput)?;
    let documents = match from_json(serde_json::from_str(json_str)?) {
        Value::Array(documents) => documents,
        document => vec![document],
    };

    let evaluator = Evaluator::new(&prepared.parameters);
    let mut matched = Vec::new();
    for document in documents {
        if evaluator.matches(&prepared.select, &document)? {
            matched.push(document);
        }
    }
    Ok(matched)
}

/// The bound parameters of a generated query as a JSON-style value
pub fn parameters_value(sql: &SqlQuery) -> Value {
    Value::Array(
        sql.parameters
            .iter()
            .map(|p| {
                Value::Object(
                    [
                        ("name".to_string(), Value::String(p.name.clone())),
                        ("value".to_string(), p.value.clone()),
                    ]
                    .into_iter()
                    .collect(),
                )
            })
            .collect(),
    )
}
