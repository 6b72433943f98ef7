pub struct Employee;

#[jagg::table("employee")]
impl jagg::Table for Employee {
    #[primary_key]
    fn id() -> i64;

    #[foreign(Self(manager_id) => Employee)]
    fn manager() -> Employee;

    #[foreign(Employee(manager_id) => Self)]
    fn reports() -> [Employee];
}

fn main() {
    let (sql, _) = jagg::select::<Employee>()
        .left_join("manager")
        .left_join("reports")
        .must_render();

    assert!(sql.contains(r#""employee.manager""#));
    assert!(sql.contains(r#"where "employee.reports"."manager_id" = "employee"."id""#));
}
