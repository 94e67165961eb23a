use super::*;

#[derive(Debug, Clone)]
enum TestExpr {
    Scan(&'static str),
    Filter(GroupId, &'static str),
    Join(GroupId, GroupId),
    Broken,
}

impl MemoExpr for TestExpr {
    fn num_children(&self) -> usize {
        match self {
            TestExpr::Scan(_) => 0,
            TestExpr::Filter(_, _) => 1,
            TestExpr::Join(_, _) => 2,
            TestExpr::Broken => 1,
        }
    }

    fn get_child(&self, i: usize) -> Option<GroupId> {
        match (self, i) {
            (TestExpr::Filter(input, _), 0) => Some(*input),
            (TestExpr::Join(left, _), 0) => Some(*left),
            (TestExpr::Join(_, right), 1) => Some(*right),
            _ => None,
        }
    }

    fn format_expr<F>(&self, f: &mut F)
    where
        F: MemoExprFormatter,
    {
        match self {
            TestExpr::Scan(src) => {
                f.write_name("Scan");
                f.write_source(src);
            }
            TestExpr::Filter(input, filter) => {
                f.write_name("Filter");
                f.write_input("input", input);
                f.write_value("filter", filter);
            }
            TestExpr::Join(left, right) => {
                f.write_name("Join");
                f.write_input("left", left);
                f.write_input("right", right);
            }
            TestExpr::Broken => f.write_name("Broken"),
        }
    }
}

fn expect_memo(memo: &Memo<TestExpr>, expected: &str) {
    let lines: Vec<&str> = expected.trim().split('\n').map(|l| l.trim_start()).collect();
    let actual: Vec<String> = format_memo(memo).trim().split('\n').map(|l| l.trim_start().to_string()).collect();
    assert_eq!(actual, lines);
}

#[test]
fn test_insert_group() {
    let mut memo = Memo::new();
    let scan = memo.insert_group(TestExpr::Scan("A")).unwrap();
    let filter = memo.insert_group(TestExpr::Filter(scan, "a > 1")).unwrap();

    assert_eq!(memo.num_groups(), 2);
    assert_eq!(memo.num_exprs(), 2);

    let group = memo.get_group(&filter).unwrap();
    assert_eq!(group.id(), filter);
    assert!(matches!(group.expr(), TestExpr::Filter(input, _) if *input == scan));

    expect_memo(
        &memo,
        r#"
01 Filter input=00 filter=a > 1
00 Scan A
"#,
    );
}

#[test]
fn test_identical_exprs_are_stored_once() {
    let mut memo = Memo::new();
    let scan1 = memo.insert_group(TestExpr::Scan("A")).unwrap();
    let scan2 = memo.insert_group(TestExpr::Scan("A")).unwrap();
    assert_eq!(scan1, scan2);

    let join = memo.insert_group(TestExpr::Join(scan1, scan2)).unwrap();

    assert_eq!(memo.num_groups(), 2);
    assert_eq!(memo.num_exprs(), 2);

    expect_memo(
        &memo,
        r#"
01 Join left=00 right=00
00 Scan A
"#,
    );

    let join_group = memo.get_group(&join).unwrap();
    assert_eq!(join_group.mexprs().count(), 1);
}

#[test]
fn test_insert_group_member() {
    let mut memo = Memo::new();
    let a = memo.insert_group(TestExpr::Scan("A")).unwrap();
    let b = memo.insert_group(TestExpr::Scan("B")).unwrap();
    let join = memo.insert_group(TestExpr::Join(a, b)).unwrap();

    let expr_id = memo.insert_group_member(join, TestExpr::Join(b, a)).unwrap();
    let same_id = memo.insert_group_member(join, TestExpr::Join(b, a)).unwrap();
    assert_eq!(expr_id, same_id);

    let group = memo.get_group(&join).unwrap();
    let members: Vec<(ExprId, GroupId)> = group.mexprs().map(|e| (e.id(), e.group_id())).collect();
    assert_eq!(members.len(), 2);
    assert_eq!(members[1], (expr_id, join));
    assert!(matches!(group.expr(), TestExpr::Join(l, r) if *l == a && *r == b), "first expression is kept");

    expect_memo(
        &memo,
        r#"
02 Join left=00 right=01
   Join left=01 right=00
01 Scan B
00 Scan A
"#,
    );
}

#[test]
fn test_reject_member_of_another_group() {
    let mut memo = Memo::new();
    let a = memo.insert_group(TestExpr::Scan("A")).unwrap();
    let b = memo.insert_group(TestExpr::Scan("B")).unwrap();

    let err = memo.insert_group_member(b, TestExpr::Scan("A")).expect_err("belongs to another group");
    assert!(err.to_string().contains(&format!("already belongs to group {}", a)), "{}", err);
}

#[test]
fn test_reject_unknown_groups() {
    let mut memo: Memo<TestExpr> = Memo::new();
    let a = memo.insert_group(TestExpr::Scan("A")).unwrap();

    let missing = GroupId(10);
    let err = memo.insert_group(TestExpr::Filter(missing, "x")).expect_err("missing child");
    assert!(err.to_string().contains("references a group that does not exist: 10"), "{}", err);

    memo.insert_group_member(missing, TestExpr::Filter(a, "x")).expect_err("missing group");
    assert!(memo.get_group(&missing).is_err(), "missing group");

    memo.insert_group(TestExpr::Broken).expect_err("missing child expression");
    assert_eq!(memo.num_groups(), 1);
}

#[test]
fn test_ids_format() {
    assert_eq!(format!("{}", GroupId(3)), "03");
    assert_eq!(format!("{:?}", GroupId(3)), "GroupId(3)");
    assert_eq!(format!("{}", ExprId(12)), "12");
}
