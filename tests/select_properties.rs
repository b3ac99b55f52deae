//! Randomized checks of executor invariants.
//!
//! Every test draws its data from a seeded `StdRng` so failures reproduce.

use std::sync::Arc;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use selectdb::datum::{evaluate, AttrType, Value};
use selectdb::executor::{SelectExecutor, TupleSet};
use selectdb::sql::{CompOp, Condition, Operand, RelAttr, Selects};
use selectdb::storage::{ColumnDef, DefaultHandler};
use selectdb::tx::{TransactionManager, Trx};

const DB: &str = "sys";
const SEEDS: [u64; 5] = [1, 7, 42, 1234, 98765];
const COMPARISONS: [CompOp; 6] = [
    CompOp::EqualTo,
    CompOp::NotEqual,
    CompOp::LessThan,
    CompOp::LessEqual,
    CompOp::GreatThan,
    CompOp::GreatEqual,
];

/// `r(id INT, k INT NULL, f FLOAT NULL, s CHARS(4) NULL)` and `q(k INT NULL)`
/// filled with random rows. `id` is the insertion position in `r`.
struct TestContext {
    handler: DefaultHandler,
    tx_manager: Arc<TransactionManager>,
}

impl TestContext {
    fn random(rng: &mut StdRng) -> Self {
        let handler = DefaultHandler::new();
        handler.create_database(DB).unwrap();
        let r = handler
            .create_table(
                DB,
                "r",
                &[
                    ColumnDef::new("id", AttrType::Ints),
                    ColumnDef::new("k", AttrType::Ints).nullable(),
                    ColumnDef::new("f", AttrType::Floats).nullable(),
                    ColumnDef::chars("s", 4).nullable(),
                ],
            )
            .unwrap();
        let q = handler
            .create_table(DB, "q", &[ColumnDef::new("k", AttrType::Ints).nullable()])
            .unwrap();

        let tx_manager = Arc::new(TransactionManager::new());
        let loader = Trx::begin(&tx_manager);
        for id in 0..rng.gen_range(10..40) {
            let row = [Value::Int(id), random_int(rng), random_float(rng), random_text(rng)];
            loader.insert(&r, &row).unwrap();
        }
        for _ in 0..rng.gen_range(3..12) {
            loader.insert(&q, &[random_int(rng)]).unwrap();
        }
        loader.commit().unwrap();

        Self { handler, tx_manager }
    }

    fn execute(&self, selects: &Selects) -> TupleSet {
        let trx = Trx::begin(&self.tx_manager);
        let result = SelectExecutor::new(&self.handler, DB, &trx).execute(selects).unwrap();
        trx.commit().unwrap();
        result
    }
}

fn random_int(rng: &mut StdRng) -> Value {
    if rng.gen_bool(0.2) {
        Value::Null
    } else {
        Value::Int(rng.gen_range(-3..4))
    }
}

fn random_float(rng: &mut StdRng) -> Value {
    if rng.gen_bool(0.2) {
        Value::Null
    } else {
        Value::Float(rng.gen_range(-6..7) as f32 / 2.0)
    }
}

fn random_text(rng: &mut StdRng) -> Value {
    if rng.gen_bool(0.2) {
        Value::Null
    } else {
        let text = ["", "a", "ab", "b", "ba", "zz"].choose(rng).copied().unwrap_or_default();
        Value::Chars(text.to_string())
    }
}

/// A random single-table predicate on `r`.
fn random_condition(rng: &mut StdRng) -> Condition {
    let op = *COMPARISONS.choose(rng).unwrap();
    let (column, literal) = match rng.gen_range(0..4) {
        0 => ("k", random_int(rng)),
        1 => ("f", random_float(rng)),
        2 => ("f", random_int(rng)),
        _ => ("s", random_text(rng)),
    };
    let literal = if literal.is_null() { Value::Int(0) } else { literal };
    let literal = match (column, literal) {
        ("s", Value::Chars(s)) => Value::Chars(s),
        ("s", _) => Value::Chars("b".into()),
        (_, value) => value,
    };
    if rng.gen_bool(0.5) {
        Condition::new(Operand::qualified("r", column), op, literal)
    } else {
        Condition::new(literal, op.flip(), Operand::qualified("r", column))
    }
}

fn select_r(conditions: &[Condition]) -> Selects {
    let mut builder = Selects::builder().column(RelAttr::star()).from("r");
    for condition in conditions {
        builder = builder.filter(condition.clone());
    }
    builder.build()
}

fn rows(result: &TupleSet) -> Vec<Vec<Value>> {
    result
        .tuples()
        .iter()
        .map(|t| t.values().iter().map(|v| (**v).clone()).collect())
        .collect()
}

/// Evaluates a bound-free predicate on an `r` row laid out as `id, k, f, s`.
fn holds(condition: &Condition, row: &[Value]) -> bool {
    let operand = |operand: &Operand| match operand {
        Operand::Value(value) => value.clone(),
        Operand::Attr(attr) => {
            let index = ["id", "k", "f", "s"]
                .iter()
                .position(|c| *c == attr.attribute_name)
                .unwrap();
            row[index].clone()
        }
    };
    evaluate(condition.comp, &operand(&condition.left), &operand(&condition.right))
}

#[test]
fn test_scan_tuples_match_schema() {
    for seed in SEEDS {
        let mut rng = StdRng::seed_from_u64(seed);
        let ctx = TestContext::random(&mut rng);
        let result = ctx.execute(&select_r(&[]));

        for tuple in result.tuples() {
            assert_eq!(tuple.len(), result.schema().len());
            for (i, value) in tuple.values().iter().enumerate() {
                let declared = result.schema().field(i).attr_type;
                assert!(value.is_null() || value.attr_type() == declared, "seed {seed}");
            }
        }
    }
}

#[test]
fn test_push_down_matches_post_filtering() {
    for seed in SEEDS {
        let mut rng = StdRng::seed_from_u64(seed);
        let ctx = TestContext::random(&mut rng);
        let all_rows = rows(&ctx.execute(&select_r(&[])));

        for _ in 0..20 {
            let conditions: Vec<Condition> = (0..rng.gen_range(1..4)).map(|_| random_condition(&mut rng)).collect();
            let pushed_down = rows(&ctx.execute(&select_r(&conditions)));
            let post_filtered: Vec<Vec<Value>> = all_rows
                .iter()
                .filter(|row| conditions.iter().all(|c| holds(c, row)))
                .cloned()
                .collect();
            assert_eq!(pushed_down, post_filtered, "seed {seed}, conditions {conditions:?}");
        }
    }
}

#[test]
fn test_filter_is_idempotent() {
    for seed in SEEDS {
        let mut rng = StdRng::seed_from_u64(seed);
        let ctx = TestContext::random(&mut rng);

        for _ in 0..10 {
            let conditions: Vec<Condition> = (0..rng.gen_range(1..3)).map(|_| random_condition(&mut rng)).collect();
            let doubled: Vec<Condition> = conditions.iter().chain(conditions.iter()).cloned().collect();
            assert_eq!(
                rows(&ctx.execute(&select_r(&conditions))),
                rows(&ctx.execute(&select_r(&doubled))),
                "seed {seed}"
            );
        }
    }
}

#[test]
fn test_join_is_deterministic() {
    for seed in SEEDS {
        let mut rng = StdRng::seed_from_u64(seed);
        let ctx = TestContext::random(&mut rng);
        let op = *COMPARISONS.choose(&mut rng).unwrap();
        let selects = Selects::builder()
            .column(RelAttr::qualified("r", "id"))
            .column(RelAttr::qualified("q", "k"))
            .from("r")
            .from("q")
            .filter(Condition::new(Operand::qualified("r", "k"), op, Operand::qualified("q", "k")))
            .build();

        let first = rows(&ctx.execute(&selects));
        let second = rows(&ctx.execute(&selects));
        assert_eq!(first, second, "seed {seed}");
        assert!(first.iter().all(|row| !row[1].is_null()), "seed {seed}");
    }
}

#[test]
fn test_null_operands_reject_rows() {
    for seed in SEEDS {
        let mut rng = StdRng::seed_from_u64(seed);
        let ctx = TestContext::random(&mut rng);

        for op in COMPARISONS {
            let against_literal = Condition::new(Operand::qualified("r", "k"), op, Value::Int(0));
            let result = rows(&ctx.execute(&select_r(&[against_literal])));
            assert!(result.iter().all(|row| !row[1].is_null()), "seed {seed}, op {op}");

            let against_column = Condition::new(Operand::qualified("r", "k"), op, Operand::qualified("r", "f"));
            let result = rows(&ctx.execute(&select_r(&[against_column])));
            assert!(
                result.iter().all(|row| !row[1].is_null() && !row[2].is_null()),
                "seed {seed}, op {op}"
            );

            let against_null = Condition::new(Operand::qualified("r", "k"), op, Value::Null);
            assert!(ctx.execute(&select_r(&[against_null])).is_empty(), "seed {seed}, op {op}");
        }
    }
}

#[test]
fn test_order_by_is_stable() {
    for seed in SEEDS {
        let mut rng = StdRng::seed_from_u64(seed);
        let ctx = TestContext::random(&mut rng);
        let is_desc = rng.gen_bool(0.5);
        let selects = Selects::builder()
            .column(RelAttr::new("k"))
            .column(RelAttr::new("id"))
            .from("r")
            .order_by(RelAttr::new("k"), is_desc)
            .build();

        let result = rows(&ctx.execute(&selects));
        for pair in result.windows(2) {
            let ordering = pair[0][0].sort_cmp(&pair[1][0]);
            let ordering = if is_desc { ordering.reverse() } else { ordering };
            assert!(ordering.is_le(), "seed {seed}");
            if ordering.is_eq() {
                assert!(pair[0][1].sort_cmp(&pair[1][1]).is_lt(), "seed {seed}");
            }
        }
    }
}
