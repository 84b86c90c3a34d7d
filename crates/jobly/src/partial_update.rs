//! Partial-update compiler.
//!
//! Turns a sparse field→value mapping into the `SET` list of an `UPDATE`
//! statement plus its positional parameters:
//!
//! ```ignore
//! let update = sql_for_partial_update(
//!     [("firstName", "Test".into()), ("age", 30.into())],
//!     &[("firstName", "first_name")],
//! )?;
//! assert_eq!(update.set_cols, r#""first_name"=$1, "age"=$2"#);
//! ```

use crate::error::{JoblyError, JoblyResult};
use crate::value::FieldValue;

/// A compiled `SET` clause and the values its placeholders refer to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartialUpdate {
    /// `"<column>"=$<i>` assignments joined with `", "`, in input order.
    pub set_cols: String,
    /// Values aligned with `$1..$n`.
    pub values: Vec<FieldValue>,
}

impl PartialUpdate {
    /// Index of the first placeholder after the `SET` values (`n + 1`).
    ///
    /// Use it to number the key in `WHERE <key> = $<next_param>`.
    pub fn next_param(&self) -> usize {
        self.values.len() + 1
    }
}

/// Compile `data` into a [`PartialUpdate`].
///
/// `js_to_sql` maps external field names to storage column names; fields
/// without an entry are used as the column name unchanged. No value or type
/// checking happens here: callers hand in validated data.
///
/// Returns [`JoblyError::BadRequest`] if `data` is empty.
pub fn sql_for_partial_update<K>(
    data: impl IntoIterator<Item = (K, FieldValue)>,
    js_to_sql: &[(&str, &str)],
) -> JoblyResult<PartialUpdate>
where
    K: AsRef<str>,
{
    let mut set_cols = String::new();
    let mut values = Vec::new();

    for (field, value) in data {
        let field = field.as_ref();
        let column = js_to_sql
            .iter()
            .find(|(js, _)| *js == field)
            .map_or(field, |(_, col)| *col);

        values.push(value);
        if values.len() > 1 {
            set_cols.push_str(", ");
        }
        set_cols.push('"');
        set_cols.push_str(column);
        set_cols.push_str("\"=$");
        set_cols.push_str(&values.len().to_string());
    }

    if values.is_empty() {
        return Err(JoblyError::bad_request("No data"));
    }

    Ok(PartialUpdate { set_cols, values })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn translates_mapped_fields_and_keeps_others() {
        let update = sql_for_partial_update(
            [("firstName", FieldValue::from("Test")), ("age", FieldValue::from(30))],
            &[("firstName", "first_name")],
        )
        .unwrap();

        assert_eq!(update.set_cols, r#""first_name"=$1, "age"=$2"#);
        assert_eq!(
            update.values,
            vec![FieldValue::Text("Test".into()), FieldValue::Int(30)]
        );
        assert_eq!(update.next_param(), 3);
    }

    #[test]
    fn single_field() {
        let update =
            sql_for_partial_update([("name", FieldValue::from("New"))], &[]).unwrap();
        assert_eq!(update.set_cols, r#""name"=$1"#);
        assert_eq!(update.values.len(), 1);
    }

    #[test]
    fn empty_data_is_bad_request() {
        let err = sql_for_partial_update(Vec::<(&str, FieldValue)>::new(), &[]).unwrap_err();
        assert!(err.is_bad_request());
        assert_eq!(err.to_string(), "Bad request: No data");
    }

    #[test]
    fn placeholders_follow_input_order() {
        let fields = ["d", "a", "c", "b", "e", "f", "g", "h", "i", "j", "k"];
        let update = sql_for_partial_update(
            fields.iter().map(|f| (*f, FieldValue::Null)),
            &[],
        )
        .unwrap();

        let cols: Vec<&str> = update.set_cols.split(", ").collect();
        assert_eq!(cols.len(), fields.len());
        for (i, (col, field)) in cols.iter().zip(fields).enumerate() {
            assert_eq!(*col, format!("\"{field}\"=${}", i + 1));
        }
    }

    #[test]
    fn null_values_are_kept_as_assignments() {
        let update = sql_for_partial_update(
            [("logoUrl", FieldValue::Null)],
            &[("logoUrl", "logo_url")],
        )
        .unwrap();
        assert_eq!(update.set_cols, r#""logo_url"=$1"#);
        assert_eq!(update.values, vec![FieldValue::Null]);
    }

    #[test]
    fn owned_keys_are_accepted() {
        let data = vec![(String::from("title"), FieldValue::from("Dev"))];
        let update = sql_for_partial_update(data, &[]).unwrap();
        assert_eq!(update.set_cols, r#""title"=$1"#);
    }
}
