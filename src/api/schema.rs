//! Schema contract: operation names, kinds and argument shapes.
//!
//! Argument bundles are checked here, before the store is touched. A
//! request missing a required field is rejected with
//! [`CatalogError::Validation`]; one with the wrong JSON types is rejected
//! with [`CatalogError::InvalidArguments`].

use crate::error::{CatalogError, Result};
use crate::types::{BookPatch, NewBook};
use serde_json::{Map, Value};
use std::fmt;

/// GraphQL declaration of the exposed schema.
pub const SCHEMA_SDL: &str = r#"type Book {
  id: ID!
  title: String!
  description: String
  rating: Float
  author: String!
  year: Int
}

input BookInput {
  title: String!
  description: String
  rating: Float
  author: String!
  year: Int
}

input BookUpdate {
  id: ID!
  title: String
  description: String
  rating: Float
  author: String
  year: Int
}

type Query {
  allBooks(search: String): [Book!]!
  getBook(id: ID!): Book
}

type Mutation {
  addBook(input: BookInput!): Book!
  updateBook(input: BookUpdate!): Book
  deleteBook(id: ID!): Book
}

type Subscription {
  bookSub: Book!
}
"#;

/// Category of an operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OperationKind {
    Query,
    Mutation,
    Subscription,
}

impl OperationKind {
    pub fn as_str(self) -> &'static str {
        match self {
            OperationKind::Query => "query",
            OperationKind::Mutation => "mutation",
            OperationKind::Subscription => "subscription",
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Every operation the schema declares.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Operation {
    AllBooks,
    GetBook,
    AddBook,
    UpdateBook,
    DeleteBook,
    BookSub,
}

impl Operation {
    pub const ALL: [Operation; 6] = [
        Operation::AllBooks,
        Operation::GetBook,
        Operation::AddBook,
        Operation::UpdateBook,
        Operation::DeleteBook,
        Operation::BookSub,
    ];

    /// Look up an operation by its schema name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.name() == name)
    }

    pub fn name(self) -> &'static str {
        match self {
            Operation::AllBooks => "allBooks",
            Operation::GetBook => "getBook",
            Operation::AddBook => "addBook",
            Operation::UpdateBook => "updateBook",
            Operation::DeleteBook => "deleteBook",
            Operation::BookSub => "bookSub",
        }
    }

    pub fn kind(self) -> OperationKind {
        match self {
            Operation::AllBooks | Operation::GetBook => OperationKind::Query,
            Operation::AddBook | Operation::UpdateBook | Operation::DeleteBook => {
                OperationKind::Mutation
            }
            Operation::BookSub => OperationKind::Subscription,
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A validated call, ready to be bound to the store.
///
/// Ids stay in wire form; an id that names no book is not a schema error.
#[derive(Clone, Debug, PartialEq)]
pub enum OperationCall {
    AllBooks { search: Option<String> },
    GetBook { id: String },
    AddBook { input: NewBook },
    UpdateBook { id: String, patch: BookPatch },
    DeleteBook { id: String },
    BookSub,
}

impl OperationCall {
    /// Validate an argument bundle against the operation's declared inputs.
    ///
    /// `args` may be `null` for operations without required arguments.
    pub fn parse(operation: Operation, args: &Value) -> Result<Self> {
        let empty = Map::new();
        let args = match args {
            Value::Null => &empty,
            Value::Object(map) => map,
            other => {
                return Err(CatalogError::InvalidArguments(format!(
                    "arguments for `{}` must be an object, got {}",
                    operation,
                    type_name(other)
                )))
            }
        };

        let call = match operation {
            Operation::AllBooks => OperationCall::AllBooks {
                search: optional_string(args, "search")?,
            },
            Operation::GetBook => OperationCall::GetBook {
                id: required_id(args)?,
            },
            Operation::DeleteBook => OperationCall::DeleteBook {
                id: required_id(args)?,
            },
            Operation::AddBook => {
                let input = required_object(args, "input")?;
                required_present(input, "title")?;
                required_present(input, "author")?;
                OperationCall::AddBook {
                    input: from_object(input)?,
                }
            }
            Operation::UpdateBook => {
                let input = required_object(args, "input")?;
                let id = required_id(input)?;
                let mut fields = input.clone();
                fields.remove("id");
                OperationCall::UpdateBook {
                    id,
                    patch: from_object(&fields)?,
                }
            }
            Operation::BookSub => OperationCall::BookSub,
        };

        Ok(call)
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn required_present(args: &Map<String, Value>, field: &'static str) -> Result<()> {
    match args.get(field) {
        None | Some(Value::Null) => Err(CatalogError::Validation { field }),
        Some(_) => Ok(()),
    }
}

fn required_object<'a>(
    args: &'a Map<String, Value>,
    field: &'static str,
) -> Result<&'a Map<String, Value>> {
    match args.get(field) {
        None | Some(Value::Null) => Err(CatalogError::Validation { field }),
        Some(Value::Object(map)) => Ok(map),
        Some(other) => Err(CatalogError::InvalidArguments(format!(
            "`{}` must be an object, got {}",
            field,
            type_name(other)
        ))),
    }
}

/// IDs are accepted as strings or integers, like GraphQL's `ID`.
fn required_id(args: &Map<String, Value>) -> Result<String> {
    match args.get("id") {
        None | Some(Value::Null) => Err(CatalogError::Validation { field: "id" }),
        Some(Value::String(s)) => Ok(s.clone()),
        Some(Value::Number(n)) if n.is_i64() || n.is_u64() => Ok(n.to_string()),
        Some(other) => Err(CatalogError::InvalidArguments(format!(
            "`id` must be a string or integer, got {}",
            type_name(other)
        ))),
    }
}

fn optional_string(args: &Map<String, Value>, field: &str) -> Result<Option<String>> {
    match args.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(other) => Err(CatalogError::InvalidArguments(format!(
            "`{}` must be a string, got {}",
            field,
            type_name(other)
        ))),
    }
}

fn from_object<T: serde::de::DeserializeOwned>(input: &Map<String, Value>) -> Result<T> {
    serde_json::from_value(Value::Object(input.clone()))
        .map_err(|e| CatalogError::InvalidArguments(e.to_string()))
}
