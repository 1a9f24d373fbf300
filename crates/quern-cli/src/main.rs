//! `quern` — SQL script runner and interactive console.
//!
//! With a file argument the whole file runs as one batch; without arguments
//! a line-based console starts (`quit` or `exit` to leave). Every batch is
//! parsed, lowered and printed as an AST dump, then handed through the stub
//! planner/executor so the full wiring is exercised.

use std::io::{self, BufRead, Write};
use std::process::ExitCode;

use quern_ast::render::render;
use quern_ast::Statement;
use quern_core::{QueryExecutor, QueryPlanner, StorageEngine};
use quern_error::Result;
use quern_lower::lower_sql;
use tracing::debug;

struct Session {
    engine: StorageEngine,
    planner: QueryPlanner,
    executor: QueryExecutor,
}

impl Session {
    fn new() -> Self {
        Self {
            engine: StorageEngine::new(),
            planner: QueryPlanner::new(),
            executor: QueryExecutor::new(),
        }
    }

    /// Run one SQL batch: print the dump, then feed every statement through
    /// the engine stubs.
    fn run_batch(&mut self, sql: &str) -> Result<()> {
        let stmt = lower_sql(sql)?;
        print!("{}", render(&stmt));
        self.dispatch(&stmt)?;
        Ok(())
    }

    fn dispatch(&mut self, stmt: &Statement) -> Result<()> {
        match stmt {
            Statement::StatementList(statements) => {
                for statement in statements {
                    self.dispatch(statement)?;
                }
            }
            Statement::CreateTable(create) => {
                self.engine.create_table(create.clone())?;
            }
            other => {
                let plan = self.planner.plan(other);
                let result = self.executor.execute(&plan);
                debug!(rows = result.rows.len(), "statement executed");
            }
        }
        Ok(())
    }
}

fn run_file(path: &str) -> ExitCode {
    let sql = match std::fs::read_to_string(path) {
        Ok(sql) => sql,
        Err(err) => {
            eprintln!("quern: cannot read {path}: {err}");
            return ExitCode::FAILURE;
        }
    };
    let mut session = Session::new();
    match session.run_batch(&sql) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("quern: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run_console() -> ExitCode {
    let stdin = io::stdin();
    let mut session = Session::new();
    loop {
        print!("quern> ");
        if io::stdout().flush().is_err() {
            return ExitCode::FAILURE;
        }
        let mut input = String::new();
        match stdin.lock().read_line(&mut input) {
            Ok(0) => return ExitCode::SUCCESS,
            Ok(_) => {}
            Err(err) => {
                eprintln!("quern: {err}");
                return ExitCode::FAILURE;
            }
        }
        let trimmed = input.trim();
        if trimmed.is_empty() {
            continue;
        }
        if trimmed.eq_ignore_ascii_case("quit") || trimmed.eq_ignore_ascii_case("exit") {
            return ExitCode::SUCCESS;
        }
        if let Err(err) = session.run_batch(trimmed) {
            eprintln!("quern: {err}");
        }
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let mut args = std::env::args().skip(1);
    match args.next() {
        Some(path) => run_file(&path),
        None => run_console(),
    }
}
