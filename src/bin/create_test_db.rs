use std::error::Error;
use std::path::Path;
use std::process::exit;

use clap::Parser;
use rusqlite::Connection;
use time::{Duration, OffsetDateTime};

use fintrack::{
    Amount, BudgetPeriod, NewBudget, NewCategory, NewContribution, NewGoal, NewTransaction,
    PasswordHash, TransactionType, ValidatedPassword, add_contribution, create_budget,
    create_category, create_goal, create_transaction, create_user, initialize_db,
};

/// A utility for creating a test database for the fintrack server.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to save the SQLite database to.
    #[arg(long, short)]
    output_path: String,

    /// The email address of the demo user.
    #[arg(long, default_value = "demo@example.com")]
    email: String,

    /// The password of the demo user.
    #[arg(long, default_value = "test")]
    password: String,
}

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
    let conn = Connection::open(output_path)?;

    initialize_db(&conn)?;

    println!("Creating demo user {}...", args.email);

    let password_hash = PasswordHash::new(
        ValidatedPassword::new_unchecked(&args.password),
        PasswordHash::DEFAULT_COST,
    )?;
    let user = create_user("Demo User", &args.email.to_lowercase(), password_hash, &conn)?;
    let today = OffsetDateTime::now_utc().date();

    println!("Creating categories...");

    for (name, color, icon) in [
        ("Salary", "#10b981", "briefcase"),
        ("Food & Dining", "#f97316", "utensils"),
        ("Transportation", "#3b82f6", "car"),
        ("Entertainment", "#8b5cf6", "film"),
        ("Bills & Utilities", "#ef4444", "receipt"),
    ] {
        create_category(
            user.id,
            NewCategory {
                name: name.to_owned(),
                color: color.to_owned(),
                icon: icon.to_owned(),
                description: None,
            },
            today,
            &conn,
        )?;
    }

    println!("Creating transactions...");

    let mut transaction_count = 0;
    for months_ago in 0..6 {
        let anchor = today - Duration::days(30 * months_ago);

        for (offset, description, category, cents, transaction_type) in [
            (0, "Monthly salary", "Salary", 520_000, TransactionType::Income),
            (1, "Rent", "Bills & Utilities", 180_000, TransactionType::Expense),
            (3, "Groceries", "Food & Dining", 14_250, TransactionType::Expense),
            (5, "Bus pass", "Transportation", 6_000, TransactionType::Expense),
            (8, "Cinema", "Entertainment", 3_200, TransactionType::Expense),
            (12, "Groceries", "Food & Dining", 11_875, TransactionType::Expense),
            (15, "Power bill", "Bills & Utilities", 16_340, TransactionType::Expense),
            (20, "Coffee", "Food & Dining", 450, TransactionType::Expense),
        ] {
            let date = anchor - Duration::days(offset);

            create_transaction(
                user.id,
                NewTransaction {
                    description: description.to_owned(),
                    category: category.to_owned(),
                    amount: Amount::from_cents(cents),
                    date,
                    transaction_type,
                },
                &conn,
            )?;
            transaction_count += 1;
        }
    }

    println!("Created {transaction_count} transactions.");
    println!("Creating budgets...");

    let month_start = today.replace_day(1)?;
    for (category, cents, color) in [
        ("Food & Dining", 60_000, "#f97316"),
        ("Entertainment", 10_000, "#8b5cf6"),
    ] {
        create_budget(
            user.id,
            NewBudget {
                category: category.to_owned(),
                budget_amount: Amount::from_cents(cents),
                period: BudgetPeriod::Monthly,
                color: color.to_owned(),
                start_date: month_start,
                end_date: BudgetPeriod::Monthly.end_date(month_start)?,
            },
            &conn,
        )?;
    }

    println!("Creating savings goals...");

    let emergency_fund = create_goal(
        user.id,
        NewGoal {
            name: "Emergency fund".to_owned(),
            target_amount: Amount::from_cents(1_000_000),
            deadline: today + Duration::days(365),
            category: "Safety".to_owned(),
            icon: "shield".to_owned(),
            color: "#3b82f6".to_owned(),
            monthly_target: Amount::from_cents(80_000),
        },
        &conn,
    )?;
    add_contribution(
        user.id,
        emergency_fund.id,
        NewContribution {
            amount: Amount::from_cents(250_000),
            date: today,
        },
        &conn,
    )?;

    println!("Success! Log in as {} with the password '{}'.", args.email, args.password);

    Ok(())
}
