use graphql_parser::{query, schema};

#[derive(thiserror::Error, Debug)]
#[error("Failed to parse schema: {0}")]
pub struct SchemaParseError(#[from] schema::ParseError);

#[derive(thiserror::Error, Debug)]
#[error("Failed to parse operation: {0}")]
pub struct OperationParseError(#[from] query::ParseError);

#[inline]
pub fn parse_schema(sdl: &str) -> Result<schema::Document<'_, String>, SchemaParseError> {
    Ok(schema::parse_schema::<String>(sdl)?)
}

#[inline]
pub fn parse_operation(operation: &str) -> Result<query::Document<'_, String>, OperationParseError> {
    Ok(query::parse_query::<String>(operation)?)
}
