use capture_core::{CaptureError, CaptureOptions, Shared, args, capture, deferred, shared};
use capture_macros::{capturable, capturable_methods};
use serde::{Deserialize, Serialize};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct Money {
    currency: String,
    cents: i64,
}

#[capturable(methods)]
#[derive(Debug, Default)]
struct Ledger {
    #[capture(readonly)]
    owner: String,
    entries: Vec<Money>,
}

#[capturable_methods]
impl Ledger {
    pub fn record(&mut self, entry: Money) -> usize {
        self.entries.push(entry);
        self.entries.len()
    }

    pub fn total(&self) -> i64 {
        self.entries.iter().map(|m| m.cents).sum()
    }
}

#[capturable(methods)]
#[derive(Debug, Default)]
struct Account {
    #[capture(flatten)]
    ledger: Ledger,
    #[capture(rename = "creditLimit")]
    credit_limit: i64,
    #[capture(skip)]
    audit: Vec<String>,
}

#[derive(Debug)]
enum AccountError {
    OverLimit { requested: i64, limit: i64 },
}

impl std::fmt::Display for AccountError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::OverLimit { requested, limit } => {
                write!(f, "withdrawal {requested} exceeds limit {limit}")
            }
        }
    }
}

#[capturable_methods]
impl Account {
    pub fn withdraw(&mut self, cents: i64) -> Result<i64, AccountError> {
        let balance = self.ledger.total();
        if cents > balance + self.credit_limit {
            return Err(AccountError::OverLimit {
                requested: cents,
                limit: self.credit_limit,
            });
        }
        self.ledger.record(Money {
            currency: "EUR".into(),
            cents: -cents,
        });
        self.audit.push(format!("withdraw {cents}"));
        Ok(self.ledger.total())
    }
}

fn account() -> Shared<Account> {
    shared(Account {
        ledger: Ledger {
            owner: "alice".into(),
            entries: Vec::new(),
        },
        credit_limit: 50,
        audit: Vec::new(),
    })
}

fn deferred_batch(options: CaptureOptions) -> Result<(), CaptureError> {
    let source = account();
    let batch = deferred(source.clone(), options);

    batch.call("record", args![{ "currency": "EUR", "cents": 500 }])?;
    batch.call("withdraw", args![200])?;
    batch.set("creditLimit", 0)?;

    info!(pending = batch.queue_len(), "batch recorded");
    println!(
        "owner={} limit={}",
        batch.get("owner")?,
        batch.get("creditLimit")?
    );

    let results = batch.execute_all()?;
    println!("results={results:?}");
    let total = source
        .read()
        .map_err(|_| CaptureError::Poisoned)?
        .ledger
        .total();
    println!("total after replay={total}");
    Ok(())
}

fn pausable_capture(options: CaptureOptions) -> Result<(), CaptureError> {
    let source = account();
    let facade = capture(source, options);

    facade.call("withdraw", args![30])?;
    facade.pause_capture();
    let total = facade.call("total", args![])?;
    println!("paused read of total={total:?}");
    facade.resume_capture();
    // 立即模式下失败在调用处返回，命令仍留在队列中
    if let Err(err) = facade.call("withdraw", args![100]) {
        println!("withdraw failed: {err}");
    }

    match facade.execute_all() {
        Ok(results) => println!("replayed {results:?}"),
        Err(err) => {
            println!("replay failed: {err}");
            println!("root cause: {}", err.root_cause());
        }
    }

    for failure in facade.install_failures() {
        println!("skipped member: {failure}");
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("capture_core=debug,demo=info")),
        )
        .init();

    let options: CaptureOptions = serde_json::from_str(r#"{ "executeImmediately": false }"#)?;
    deferred_batch(options)?;

    let options = CaptureOptions::builder().execute_immediately(true).build();
    pausable_capture(options)?;
    Ok(())
}
