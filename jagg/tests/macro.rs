#[test]
fn macro_expansions_compile() {
    let t = trybuild::TestCases::new();
    t.pass("tests/macro/*.rs");
}

#[test]
fn macro_misuse_is_rejected() {
    let t = trybuild::TestCases::new();
    t.compile_fail("tests/macro_error/*.rs");
}
