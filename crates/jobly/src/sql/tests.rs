use super::*;

#[test]
fn builds_placeholders_in_order() {
    let mut q = sql("SELECT * FROM jobs WHERE salary >= ");
    q.push_bind(1).push(" AND title ILIKE ").push_bind("x");

    assert_eq!(q.to_sql(), "SELECT * FROM jobs WHERE salary >= $1 AND title ILIKE $2");
    assert_eq!(q.params_ref().len(), 2);
}

#[test]
fn can_compose_fragments() {
    let mut w = Sql::empty();
    w.push(" WHERE id = ").push_bind(42);

    let mut q = sql("SELECT * FROM jobs");
    q.push_sql(w);

    assert_eq!(q.to_sql(), "SELECT * FROM jobs WHERE id = $1");
    assert_eq!(q.param_count(), 1);
}

#[test]
fn composed_fragments_are_renumbered() {
    let mut a = Sql::empty();
    a.push("a = ").push_bind(1);
    let mut b = Sql::empty();
    b.push("b = ").push_bind(2);

    let mut q = sql("SELECT 1");
    q.push_joined(" WHERE ", " AND ", [a, b]);
    assert_eq!(q.to_sql(), "SELECT 1 WHERE a = $1 AND b = $2");
}

#[test]
fn joined_without_fragments_writes_nothing() {
    let mut q = sql("SELECT handle FROM companies");
    q.push_joined(" WHERE ", " AND ", Vec::new());
    q.push(" ORDER BY name");
    assert_eq!(q.to_sql(), "SELECT handle FROM companies ORDER BY name");
    assert_eq!(q.param_count(), 0);
}

#[test]
fn renders_double_digit_placeholders() {
    let mut q = sql("SELECT ");
    for i in 0..11 {
        if i > 0 {
            q.push(", ");
        }
        q.push_bind(i);
    }
    assert!(q.to_sql().ends_with("$10, $11"));
}

#[test]
fn query_keeps_sql_verbatim() {
    let q = query("DELETE FROM jobs WHERE id = $1 RETURNING id").bind(7_i32);
    assert_eq!(q.sql(), "DELETE FROM jobs WHERE id = $1 RETURNING id");
    assert_eq!(q.params_ref().len(), 1);
}

#[test]
fn query_bind_all_appends_in_order() {
    let q = query("UPDATE t SET a = $1, b = $2 WHERE k = $3")
        .bind_all(vec![1_i32, 2])
        .bind(3_i32);
    assert_eq!(q.params_ref().len(), 3);
}
