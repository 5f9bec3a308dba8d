//! Mini-C Compiler CLI
//!
//! The `minicc` command invokes the pipeline on a source file and prints
//! the requested artifacts, or the first stage failure.

use clap::{Parser, Subcommand};
use minic::ir::render;
use minic::{lexer, pipeline};
use std::fs;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "minicc")]
#[command(version = minic::VERSION)]
#[command(about = "The Mini-C compiler", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile a source file and print the requested artifacts
    Build {
        /// Input file to compile
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Emit tokens
        #[arg(long)]
        emit_tokens: bool,

        /// Emit the syntax tree
        #[arg(long)]
        emit_ast: bool,

        /// Emit the symbol table
        #[arg(long)]
        emit_symbols: bool,

        /// Emit the three-address code before optimization
        #[arg(long)]
        emit_ir: bool,

        /// Emit the three-address code after optimization
        #[arg(long)]
        emit_opt_ir: bool,

        /// Emit pseudocode
        #[arg(long)]
        emit_pseudo: bool,

        /// Emit pseudo-assembly
        #[arg(long)]
        emit_asm: bool,
    },

    /// Check a file for errors without printing artifacts
    Check {
        /// Input file to check
        #[arg(value_name = "FILE")]
        input: PathBuf,
    },

    /// Tokenize a file and print the tokens
    Tokenize {
        /// Input file to tokenize
        #[arg(value_name = "FILE")]
        input: PathBuf,
    },

    /// Parse a file and print the syntax tree
    Parse {
        /// Input file to parse
        #[arg(value_name = "FILE")]
        input: PathBuf,
    },

    /// Compile a file and print only the program output
    Run {
        /// Input file to run
        #[arg(value_name = "FILE")]
        input: PathBuf,
    },
}

fn read_source(path: &PathBuf) -> miette::Result<String> {
    if path.extension().and_then(|ext| ext.to_str()) != Some(minic::FILE_EXTENSION) {
        return Err(miette::miette!(
            "Expected a .{} source file: {}",
            minic::FILE_EXTENSION,
            path.display()
        ));
    }
    fs::read_to_string(path).map_err(|e| miette::miette!("Failed to read file: {}", e))
}

fn main() -> miette::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Build {
            input,
            emit_tokens,
            emit_ast,
            emit_symbols,
            emit_ir,
            emit_opt_ir,
            emit_pseudo,
            emit_asm,
        } => {
            let source = read_source(&input)?;
            let artifacts = pipeline::compile(&source).map_err(|e| miette::miette!("{}", e))?;

            if emit_tokens {
                println!("=== Tokens ===");
                for token in &artifacts.tokens {
                    println!(
                        "{:>4}..{:<4} {:12} {:?}",
                        token.span.start,
                        token.span.end,
                        format!("{:?}", token.kind),
                        token.text(&source)
                    );
                }
            }

            if emit_ast {
                println!("=== AST ===");
                println!("{:#?}", artifacts.ast);
            }

            if emit_symbols {
                println!("=== Symbols ===");
                for (name, ty) in artifacts.symbols.iter() {
                    println!("  {:<20} {}", name, ty);
                }
            }

            if emit_ir {
                println!("=== IR ===");
                for line in render(&artifacts.ir) {
                    println!("{}", line);
                }
            }

            if emit_opt_ir {
                println!("=== Optimized IR ===");
                for line in render(&artifacts.optimized_ir) {
                    println!("{}", line);
                }
            }

            if emit_pseudo {
                println!("=== Pseudocode ===");
                for line in &artifacts.pseudocode {
                    println!("{}", line);
                }
            }

            if emit_asm {
                println!("=== Assembly ===");
                for line in &artifacts.assembly {
                    println!("{}", line);
                }
            }

            println!("=== Output ===");
            for value in &artifacts.output {
                println!("{}", value);
            }

            Ok(())
        }

        Commands::Check { input } => {
            let source = read_source(&input)?;
            pipeline::compile(&source).map_err(|e| miette::miette!("{}", e))?;
            println!("No errors found.");
            Ok(())
        }

        Commands::Tokenize { input } => {
            let source = read_source(&input)?;
            let (tokens, line_map) =
                lexer::lex(&source).map_err(|e| miette::miette!("{}", e))?;

            for token in &tokens {
                println!(
                    "line {:<4} {:12} {:?}",
                    line_map.line_at(token.span.start),
                    format!("{:?}", token.kind),
                    token.text(&source)
                );
            }
            Ok(())
        }

        Commands::Parse { input } => {
            let source = read_source(&input)?;
            let (program, includes) =
                minic::parser::parse(&source).map_err(|e| miette::miette!("{}", e))?;

            if !includes.is_empty() {
                println!("Includes: {:?}", includes);
            }
            println!("{:#?}", program);
            Ok(())
        }

        Commands::Run { input } => {
            let source = read_source(&input)?;
            let artifacts = pipeline::compile(&source).map_err(|e| miette::miette!("{}", e))?;
            for value in &artifacts.output {
                println!("{}", value);
            }
            Ok(())
        }
    }
}
