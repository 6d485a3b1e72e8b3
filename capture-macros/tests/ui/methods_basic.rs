use capture_core::{Args, Target, args};
use capture_macros::{capturable, capturable_methods};

#[capturable(methods)]
struct Counter {
    x: i64,
}

#[capturable_methods]
impl Counter {
    pub fn inc(&mut self, n: i64) {
        self.x += n;
    }

    pub fn peek(&self) -> i64 {
        self.x
    }

    pub fn checked_div(&mut self, by: i64) -> Result<i64, String> {
        if by == 0 {
            return Err("division by zero".into());
        }
        self.x /= by;
        Ok(self.x)
    }

    #[capture(rename = "sumAll")]
    pub fn sum_all(&mut self, values: Args) -> usize {
        values.len()
    }

    #[capture(skip)]
    pub fn hidden(&self) {}

    pub fn new() -> Self {
        Self { x: 0 }
    }

    #[allow(dead_code)]
    fn private_helper(&self) {}
}

fn main() {
    let mut c = Counter::new();
    c.hidden();

    let names: Vec<_> = c.members().into_iter().map(|d| d.name).collect();
    assert_eq!(names, vec!["x", "inc", "peek", "checked_div", "sumAll"]);

    c.call("inc", args![4]).unwrap();
    assert_eq!(c.call("peek", args![]).unwrap(), serde_json::json!(4));
    assert!(c.call("checked_div", args![0]).is_err());
    assert_eq!(c.call("sumAll", args![1, 2, 3]).unwrap(), serde_json::json!(3));
    assert!(c.call("x", args![]).is_err());
    assert!(c.set("inc", serde_json::json!(1)).is_err());
}
