use std::borrow::Cow;

use crate::error::SqlAdapterError;
use crate::operation::{FieldMapping, Operation};
use crate::record::{Identifier, RowLike};
use crate::translation::{BuiltStatement, PlaceholderStyle};
use crate::types::RowValues;

/// Accumulates SQL text and binds, numbering markers as they are written.
struct StatementWriter {
    sql: String,
    params: Vec<RowValues>,
    style: PlaceholderStyle,
}

impl StatementWriter {
    fn new(style: PlaceholderStyle, head: &str) -> Self {
        let mut sql = String::with_capacity(head.len() + 64);
        sql.push_str(head);
        Self {
            sql,
            params: Vec::new(),
            style,
        }
    }

    fn push(&mut self, text: &str) {
        self.sql.push_str(text);
    }

    fn bind(&mut self, value: &RowValues) {
        self.params.push(value.clone());
        self.style.push_marker(&mut self.sql, self.params.len());
    }

    /// Append `col1 = ?, col2 = ?` (or `AND`-joined) for each pair.
    fn assignments(&mut self, pairs: &[(&str, &RowValues)], sep: &str) {
        for (i, (column, value)) in pairs.iter().enumerate() {
            if i > 0 {
                self.push(sep);
            }
            self.push(column);
            self.push(" = ");
            self.bind(value);
        }
    }

    fn finish(self) -> BuiltStatement<'static> {
        BuiltStatement {
            sql: Cow::Owned(self.sql),
            params: self.params,
        }
    }
}

/// Writable properties the object actually carries, in descriptor order.
fn present_writable<'a, R: RowLike + ?Sized>(
    op: &'a Operation,
    obj: &'a R,
) -> Vec<(&'a FieldMapping, &'a RowValues)> {
    op.writable_properties()
        .filter_map(|p| obj.get_field(&p.object_field).map(|v| (p, v)))
        .collect()
}

fn column_list(fields: &[(&FieldMapping, &RowValues)]) -> String {
    fields
        .iter()
        .map(|(p, _)| p.data_field.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Build a single-row INSERT.
///
/// Generated columns are never written and absent fields are left out of both the column
/// and value lists. An object with nothing to write inserts a row of column defaults.
#[must_use]
pub fn insert_statement<R: RowLike + ?Sized>(
    op: &Operation,
    obj: &R,
    style: PlaceholderStyle,
) -> BuiltStatement<'static> {
    let fields = present_writable(op, obj);
    let mut w = StatementWriter::new(style, "INSERT INTO ");
    w.push(&op.statement);

    if fields.is_empty() {
        match style {
            PlaceholderStyle::MySql => w.push(" () VALUES ()"),
            PlaceholderStyle::Sqlite => w.push(" DEFAULT VALUES"),
        }
        return w.finish();
    }

    w.push(" (");
    w.push(&column_list(&fields));
    w.push(") VALUES (");
    for (i, (_, value)) in fields.iter().enumerate() {
        if i > 0 {
            w.push(", ");
        }
        w.bind(value);
    }
    w.push(")");
    w.finish()
}

/// Build one multi-row INSERT for a whole batch.
///
/// The first object fixes the column list. Every other object must carry exactly the same
/// writable fields, otherwise the rows would not line up with the columns.
///
/// # Errors
/// Returns `ValidationError` for an empty batch, a batch with no writable fields, or objects
/// whose field sets differ from the first.
pub fn bulk_insert_statement<R: RowLike>(
    op: &Operation,
    objects: &[R],
    style: PlaceholderStyle,
) -> Result<BuiltStatement<'static>, SqlAdapterError> {
    let Some(first) = objects.first() else {
        return Err(SqlAdapterError::ValidationError(
            "bulk insert requires at least one object".into(),
        ));
    };
    let fields = present_writable(op, first);
    if fields.is_empty() {
        return Err(SqlAdapterError::ValidationError(format!(
            "bulk insert into {} has no writable fields",
            op.statement
        )));
    }

    let mut w = StatementWriter::new(style, "INSERT INTO ");
    w.push(&op.statement);
    w.push(" (");
    w.push(&column_list(&fields));
    w.push(") VALUES ");

    for (row, obj) in objects.iter().enumerate() {
        let present = op
            .writable_properties()
            .filter(|p| obj.has_field(&p.object_field))
            .count();
        if present != fields.len() {
            return Err(SqlAdapterError::ValidationError(format!(
                "bulk insert object {row} does not share the field set of the first object"
            )));
        }
        if row > 0 {
            w.push(", ");
        }
        w.push("(");
        for (i, (p, _)) in fields.iter().enumerate() {
            let Some(value) = obj.get_field(&p.object_field) else {
                return Err(SqlAdapterError::ValidationError(format!(
                    "bulk insert object {row} is missing field {}",
                    p.object_field
                )));
            };
            if i > 0 {
                w.push(", ");
            }
            w.bind(value);
        }
        w.push(")");
    }
    Ok(w.finish())
}

/// Collect every identifier field from `obj`, failing on the first one missing.
fn identifier_values<'a, R: RowLike + ?Sized>(
    op: &'a Operation,
    obj: &'a R,
    what: &str,
) -> Result<Vec<(&'a str, &'a RowValues)>, SqlAdapterError> {
    if op.identifier.is_empty() {
        return Err(SqlAdapterError::ValidationError(format!(
            "{what} on {} requires identifier fields",
            op.statement
        )));
    }
    op.identifier
        .iter()
        .map(|id| {
            obj.get_field(&id.object_field)
                .map(|v| (id.data_field.as_str(), v))
                .ok_or_else(|| {
                    SqlAdapterError::ValidationError(format!(
                        "identifier field {} is missing",
                        id.object_field
                    ))
                })
        })
        .collect()
}

/// Build an UPDATE keyed by the identifier fields.
///
/// SET covers the non-identifier properties the object carries. WHERE requires every
/// identifier field and adds each condition field the object carries.
///
/// # Errors
/// Returns `ValidationError` when an identifier field is missing or nothing would be SET.
pub fn update_statement<R: RowLike + ?Sized>(
    op: &Operation,
    obj: &R,
    style: PlaceholderStyle,
) -> Result<BuiltStatement<'static>, SqlAdapterError> {
    let set: Vec<(&str, &RowValues)> = op
        .settable_properties()
        .filter_map(|p| {
            obj.get_field(&p.object_field)
                .map(|v| (p.data_field.as_str(), v))
        })
        .collect();
    let mut predicates = identifier_values(op, obj, "update")?;
    if set.is_empty() {
        return Err(SqlAdapterError::ValidationError(format!(
            "update on {} has no fields to set",
            op.statement
        )));
    }
    predicates.extend(op.condition.iter().filter_map(|c| {
        obj.get_field(&c.object_field)
            .map(|v| (c.data_field.as_str(), v))
    }));

    let mut w = StatementWriter::new(style, "UPDATE ");
    w.push(&op.statement);
    w.push(" SET ");
    w.assignments(&set, ", ");
    w.push(" WHERE ");
    w.assignments(&predicates, " AND ");
    Ok(w.finish())
}

/// Build a DELETE for one identifier.
///
/// A scalar is shorthand for a single-column identifier; a record must carry every
/// identifier field.
///
/// # Errors
/// Returns `ValidationError` when the identifier does not fit the descriptor.
pub fn delete_statement<R: RowLike>(
    op: &Operation,
    identifier: &Identifier<R>,
    style: PlaceholderStyle,
) -> Result<BuiltStatement<'static>, SqlAdapterError> {
    let predicates: Vec<(&str, &RowValues)> = match identifier {
        Identifier::Scalar(value) => match op.identifier.as_slice() {
            [only] => vec![(only.data_field.as_str(), value)],
            other => {
                return Err(SqlAdapterError::ValidationError(format!(
                    "scalar identifier needs exactly one identifier field, {} declares {}",
                    op.statement,
                    other.len()
                )));
            }
        },
        Identifier::Fields(obj) => identifier_values(op, obj, "delete")?,
    };

    let mut w = StatementWriter::new(style, "DELETE FROM ");
    w.push(&op.statement);
    w.push(" WHERE ");
    w.assignments(&predicates, " AND ");
    Ok(w.finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::record::Record;

    fn users() -> Operation {
        Operation::new("users")
            .property("ID", "id")
            .property("Name", "name")
            .property("Email", "email")
            .property("Version", "version")
            .identifier("ID", "id")
            .generated("ID", "id")
    }

    #[test]
    fn insert_skips_generated_fields() {
        let op = Operation::new("users")
            .property("Name", "name")
            .property("Email", "email")
            .generated("ID", "id");
        let obj = Record::new().with("Name", "John").with("Email", "j@x.com");
        let built = insert_statement(&op, &obj, PlaceholderStyle::MySql);
        assert_eq!(built.sql, "INSERT INTO users (name, email) VALUES (?, ?)");
        assert_eq!(
            built.params,
            vec![RowValues::Text("John".into()), RowValues::Text("j@x.com".into())]
        );
    }

    #[test]
    fn insert_omits_absent_fields() {
        let obj = Record::new().with("Email", "j@x.com").with("ID", 5);
        let built = insert_statement(&users(), &obj, PlaceholderStyle::Sqlite);
        assert_eq!(built.sql, "INSERT INTO users (email) VALUES (?1)");
        assert_eq!(built.params.len(), 1);
    }

    #[test]
    fn insert_with_nothing_to_write_uses_defaults() {
        let obj = Record::new();
        let mysql = insert_statement(&users(), &obj, PlaceholderStyle::MySql);
        assert_eq!(mysql.sql, "INSERT INTO users () VALUES ()");
        let sqlite = insert_statement(&users(), &obj, PlaceholderStyle::Sqlite);
        assert_eq!(sqlite.sql, "INSERT INTO users DEFAULT VALUES");
        assert!(sqlite.params.is_empty());
    }

    #[test]
    fn bulk_insert_emits_one_values_list_per_object() {
        let objs = vec![
            Record::new().with("Name", "a").with("Email", "a@x"),
            Record::new().with("Name", "b").with("Email", "b@x"),
            Record::new().with("Name", "c").with("Email", "c@x"),
        ];
        let built = bulk_insert_statement(&users(), &objs, PlaceholderStyle::Sqlite).unwrap();
        assert_eq!(
            built.sql,
            "INSERT INTO users (name, email) VALUES (?1, ?2), (?3, ?4), (?5, ?6)"
        );
        assert_eq!(built.params.len(), 6);
        assert_eq!(built.params[4], RowValues::Text("c".into()));
    }

    #[test]
    fn bulk_insert_rejects_diverging_field_sets() {
        let missing = vec![
            Record::new().with("Name", "a").with("Email", "a@x"),
            Record::new().with("Name", "b"),
        ];
        let err = bulk_insert_statement(&users(), &missing, PlaceholderStyle::MySql).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);

        let extra = vec![
            Record::new().with("Name", "a"),
            Record::new().with("Name", "b").with("Email", "b@x"),
        ];
        let err = bulk_insert_statement(&users(), &extra, PlaceholderStyle::MySql).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[test]
    fn update_sets_non_identifier_fields() {
        let op = users().condition("Version", "version");
        let obj = Record::new()
            .with("ID", 7)
            .with("Name", "Jane")
            .with("Version", 3);
        let built = update_statement(&op, &obj, PlaceholderStyle::MySql).unwrap();
        assert_eq!(
            built.sql,
            "UPDATE users SET name = ?, version = ? WHERE id = ? AND version = ?"
        );
        assert_eq!(
            built.params,
            vec![
                RowValues::Text("Jane".into()),
                RowValues::Int(3),
                RowValues::Int(7),
                RowValues::Int(3)
            ]
        );
    }

    #[test]
    fn update_skips_absent_condition_fields() {
        let op = users().condition("Version", "version");
        let obj = Record::new().with("ID", 7).with("Name", "Jane");
        let built = update_statement(&op, &obj, PlaceholderStyle::Sqlite).unwrap();
        assert_eq!(built.sql, "UPDATE users SET name = ?1 WHERE id = ?2");
    }

    #[test]
    fn update_requires_every_identifier_field() {
        let obj = Record::new().with("Name", "Jane");
        let err = update_statement(&users(), &obj, PlaceholderStyle::MySql).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert!(err.to_string().contains("ID"));
    }

    #[test]
    fn update_with_nothing_to_set_is_rejected() {
        let obj = Record::new().with("ID", 1);
        let err = update_statement(&users(), &obj, PlaceholderStyle::MySql).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[test]
    fn delete_by_scalar() {
        let id: Identifier = Identifier::Scalar(RowValues::Int(42));
        let built = delete_statement(&users(), &id, PlaceholderStyle::MySql).unwrap();
        assert_eq!(built.sql, "DELETE FROM users WHERE id = ?");
        assert_eq!(built.params, vec![RowValues::Int(42)]);
    }

    #[test]
    fn delete_by_composite_key() {
        let op = Operation::new("memberships")
            .identifier("User", "user_id")
            .identifier("Group", "group_id");
        let id = Identifier::Fields(Record::new().with("User", 1).with("Group", 2));
        let built = delete_statement(&op, &id, PlaceholderStyle::Sqlite).unwrap();
        assert_eq!(
            built.sql,
            "DELETE FROM memberships WHERE user_id = ?1 AND group_id = ?2"
        );
    }

    #[test]
    fn scalar_delete_needs_single_identifier() {
        let op = Operation::new("memberships")
            .identifier("User", "user_id")
            .identifier("Group", "group_id");
        let id: Identifier = Identifier::Scalar(RowValues::Int(1));
        let err = delete_statement(&op, &id, PlaceholderStyle::MySql).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);

        let none = Operation::new("memberships");
        let err = delete_statement(&none, &id, PlaceholderStyle::MySql).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[test]
    fn composite_delete_requires_all_fields() {
        let op = Operation::new("memberships")
            .identifier("User", "user_id")
            .identifier("Group", "group_id");
        let id = Identifier::Fields(Record::new().with("User", 1));
        let err = delete_statement(&op, &id, PlaceholderStyle::MySql).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }
}
