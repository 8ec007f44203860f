use std::error::Error;
use std::path::Path;
use std::process::exit;

use clap::Parser;
use rusqlite::Connection;

use finanzas_rs::{PasswordHash, ValidatedPassword, initialize_db};

/// A utility for creating a test database for the REST API server of finanzas_rs.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to save the SQLite database to.
    #[arg(long, short)]
    output_path: String,
}

const ACCOUNT_TYPES: [&str; 3] = ["Checking", "Savings", "Credit Card"];

const CATEGORIES: [(&str, bool); 6] = [
    ("Salary", true),
    ("Interest", true),
    ("Gifts", true),
    ("Groceries", false),
    ("Rent", false),
    ("Gifts", false),
];

/// Create and populate a database for manual testing.
fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let output_path = Path::new(&args.output_path);

    match output_path.extension() {
        None => {
            eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
        Some(extension) if extension.is_empty() => {
            eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
        _ => {}
    }

    if output_path.is_file() {
        eprintln!("File already exists at {output_path:#?}!");
        exit(1);
    }

    println!("Creating database at {output_path:#?}");
    let mut conn = Connection::open(output_path)?;

    initialize_db(&conn)?;

    let transaction = conn.transaction()?;

    println!("Creating test user test@example.com with the password 'test'...");

    let password_hash = PasswordHash::new(
        ValidatedPassword::new_unchecked("test"),
        PasswordHash::DEFAULT_COST,
    )?;

    transaction.execute(
        "INSERT INTO user (first_name, last_name, email, phone, password)
        VALUES ('Test', 'User', 'test@example.com', '000 000 0000', ?1)",
        (password_hash.as_str(),),
    )?;

    println!("Creating account types...");
    for name in ACCOUNT_TYPES {
        transaction.execute("INSERT INTO account_type (name) VALUES (?1)", (name,))?;
    }

    println!("Creating categories...");
    for (name, is_income) in CATEGORIES {
        transaction.execute(
            "INSERT INTO category (name, is_income) VALUES (?1, ?2)",
            (name, is_income),
        )?;
    }

    transaction.commit()?;

    println!("Success!");

    Ok(())
}
