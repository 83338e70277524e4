use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use arrow::array::{ArrayRef, Date32Array, Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use chrono::{Days, NaiveDate};
use clap::Parser;
use parquet::arrow::ArrowWriter;
use rusty_basket::Column;

/// Generate a synthetic customer purchase table
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Number of customers
    #[arg(short, long, default_value = "500")]
    rows: usize,

    /// PRNG seed
    #[arg(short, long, default_value = "42")]
    seed: u64,

    /// Output file (.csv or .parquet)
    #[arg(short, long, default_value = "data/customer_data.csv")]
    output: PathBuf,

    /// Probability of blanking each non-id cell, to exercise imputation
    #[arg(long, default_value = "0.0")]
    missing_rate: f64,
}

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Uniform integer in `lo..hi`.
    fn range(&mut self, lo: i64, hi: i64) -> i64 {
        lo + (self.next_f64() * (hi - lo) as f64) as i64
    }

    /// `a` with probability `p_a`, otherwise `b`.
    fn pick<'a>(&mut self, a: &'a str, b: &'a str, p_a: f64) -> &'a str {
        if self.next_f64() < p_a {
            a
        } else {
            b
        }
    }
}

/// One generated customer, before optional blanking.
struct Customer {
    id: i64,
    age: Option<i64>,
    gender: Option<&'static str>,
    income: Option<i64>,
    category: Option<&'static str>,
    quantity: Option<i64>,
    price: Option<f64>,
    discount: Option<&'static str>,
    date: Option<NaiveDate>,
}

fn generate(rows: usize, rng: &mut SimpleRng) -> Vec<Customer> {
    let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap_or_default();

    (0..rows)
        .map(|i| {
            let age = rng.range(18, 60);
            let income = rng.range(20_000, 100_000);

            // Younger customers prefer clothing
            let category = if age < 30 {
                rng.pick("Clothing", "Groceries", 0.7)
            } else {
                rng.pick("Electronics", "Home Decor", 0.6)
            };

            // Electronics are expensive
            let price = match category {
                "Electronics" => rng.range(3000, 10_000),
                "Clothing" => rng.range(500, 3000),
                _ => rng.range(300, 4000),
            };

            // Higher income buys more quantity
            let mut quantity = if income > 60_000 {
                rng.range(2, 6)
            } else {
                rng.range(1, 3)
            };

            // Discounts increase quantity
            let discount = rng.pick("Yes", "No", 0.5);
            if discount == "Yes" {
                quantity += 1;
            }

            let gender = rng.pick("Male", "Female", 0.5);

            Customer {
                id: i as i64 + 1,
                age: Some(age),
                gender: Some(gender),
                income: Some(income),
                category: Some(category),
                quantity: Some(quantity),
                price: Some(price as f64),
                discount: Some(discount),
                date: start.checked_add_days(Days::new(i as u64)),
            }
        })
        .collect()
}

/// Clear `slot` with probability `rate`; returns whether it was cleared.
fn blank<T>(slot: &mut Option<T>, rate: f64, rng: &mut SimpleRng) -> bool {
    let hit = rng.next_f64() < rate;
    if hit {
        *slot = None;
    }
    hit
}

fn blank_cells(customers: &mut [Customer], rate: f64, rng: &mut SimpleRng) -> usize {
    let mut blanked = 0;
    for c in customers.iter_mut() {
        blanked += [
            blank(&mut c.age, rate, rng),
            blank(&mut c.gender, rate, rng),
            blank(&mut c.income, rate, rng),
            blank(&mut c.category, rate, rng),
            blank(&mut c.quantity, rate, rng),
            blank(&mut c.price, rate, rng),
            blank(&mut c.discount, rate, rng),
            blank(&mut c.date, rate, rng),
        ]
        .into_iter()
        .filter(|hit| *hit)
        .count();
    }
    blanked
}

fn write_csv(path: &Path, customers: &[Customer]) -> Result<()> {
    fn opt<T: ToString>(v: Option<T>) -> String {
        v.map(|x| x.to_string()).unwrap_or_default()
    }

    let mut w = csv::Writer::from_path(path)?;
    w.write_record(Column::REQUIRED.map(Column::name))?;
    for c in customers {
        w.write_record([
            c.id.to_string(),
            opt(c.age),
            opt(c.gender),
            opt(c.income),
            opt(c.category),
            opt(c.quantity),
            opt(c.price),
            opt(c.discount),
            opt(c.date.map(|d| d.format("%Y-%m-%d"))),
        ])?;
    }
    w.flush()?;
    Ok(())
}

fn write_parquet(path: &Path, customers: &[Customer]) -> Result<()> {
    let epoch = NaiveDate::from_ymd_opt(1970, 1, 1).unwrap_or_default();

    let ids = Int64Array::from_iter_values(customers.iter().map(|c| c.id));
    let ages = Int64Array::from_iter(customers.iter().map(|c| c.age));
    let genders = StringArray::from_iter(customers.iter().map(|c| c.gender));
    let incomes = Int64Array::from_iter(customers.iter().map(|c| c.income));
    let categories = StringArray::from_iter(customers.iter().map(|c| c.category));
    let quantities = Int64Array::from_iter(customers.iter().map(|c| c.quantity));
    let prices = Float64Array::from_iter(customers.iter().map(|c| c.price));
    let discounts = StringArray::from_iter(customers.iter().map(|c| c.discount));
    let dates = Date32Array::from_iter(
        customers
            .iter()
            .map(|c| c.date.map(|d| (d - epoch).num_days() as i32)),
    );

    let kinds = [
        DataType::Int64,
        DataType::Int64,
        DataType::Utf8,
        DataType::Int64,
        DataType::Utf8,
        DataType::Int64,
        DataType::Float64,
        DataType::Utf8,
        DataType::Date32,
    ];
    let fields: Vec<Field> = Column::REQUIRED
        .iter()
        .zip(kinds)
        .map(|(col, kind)| Field::new(col.name(), kind, *col != Column::CustomerId))
        .collect();
    let schema = Arc::new(Schema::new(fields));

    let columns: Vec<ArrayRef> = vec![
        Arc::new(ids),
        Arc::new(ages),
        Arc::new(genders),
        Arc::new(incomes),
        Arc::new(categories),
        Arc::new(quantities),
        Arc::new(prices),
        Arc::new(discounts),
        Arc::new(dates),
    ];
    let batch = RecordBatch::try_new(schema.clone(), columns).context("building record batch")?;

    let file = std::fs::File::create(path).context("creating output file")?;
    let mut writer = ArrowWriter::try_new(file, schema, None)?;
    writer.write(&batch)?;
    writer.close()?;
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    if !(0.0..=1.0).contains(&args.missing_rate) {
        bail!("--missing-rate must be between 0 and 1");
    }

    let mut rng = SimpleRng::new(args.seed);
    let mut customers = generate(args.rows, &mut rng);
    let blanked = blank_cells(&mut customers, args.missing_rate, &mut rng);

    if let Some(dir) = args.output.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
    }

    let ext = args
        .output
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();
    match ext.as_str() {
        "csv" => write_csv(&args.output, &customers)?,
        "parquet" | "pq" => write_parquet(&args.output, &customers)?,
        other => bail!("Unsupported output extension: .{other}"),
    }

    log::info!("Blanked {blanked} cells");
    println!(
        "Wrote {} customers to {}",
        customers.len(),
        args.output.display()
    );
    Ok(())
}
