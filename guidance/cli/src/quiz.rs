//! Interactive career quiz on a line-based terminal

use std::io::{BufRead, Write};

use anyhow::Result;
use tracing::info;

use guidance_core::{CatalogProvider, GuidanceConfig, QuestionBank, QuizEngine, QuizState};

const HELP: &str = "Type an option number, b to go back, r to restart or q to quit.";

/// Run the quiz until the student quits or input ends
pub fn run<R: BufRead, W: Write>(
    config: &GuidanceConfig,
    bank: QuestionBank,
    catalog: &dyn CatalogProvider,
    mut input: R,
    mut out: W,
) -> Result<()> {
    let mut engine = QuizEngine::new(bank, catalog).with_top_n(config.quiz.top_n);
    engine.start();
    writeln!(out, "Career quiz: {} questions. {HELP}", engine.total_questions())?;

    loop {
        match engine.state() {
            QuizState::NotStarted => engine.start(),
            QuizState::Answering(index) => {
                let Some(question) = engine.current_question().cloned() else {
                    break;
                };
                writeln!(out)?;
                writeln!(
                    out,
                    "Question {}/{}: {}",
                    index + 1,
                    engine.total_questions(),
                    question.prompt
                )?;
                for (n, option) in question.options.iter().enumerate() {
                    writeln!(out, "  {}) {}", n + 1, option.label)?;
                }

                let Some(answer) = prompt(&mut input, &mut out)? else {
                    break;
                };
                match answer.as_str() {
                    "b" => {
                        if !engine.go_back() {
                            writeln!(out, "Already at the first question.")?;
                        }
                    }
                    "r" => engine.reset(),
                    "q" => break,
                    other => match other
                        .parse::<usize>()
                        .ok()
                        .and_then(|n| n.checked_sub(1))
                        .and_then(|n| question.options.get(n))
                    {
                        Some(option) => {
                            engine.advance(&option.id)?;
                        }
                        None => writeln!(out, "{HELP}")?,
                    },
                }
            }
            QuizState::ShowingResults => {
                print_results(&engine, catalog, &mut out)?;
                writeln!(out, "Type b to change your last answer, r to restart, anything else to quit.")?;
                match prompt(&mut input, &mut out)?.as_deref() {
                    Some("b") => {
                        engine.go_back();
                    }
                    Some("r") => engine.reset(),
                    _ => break,
                }
            }
        }
    }
    Ok(())
}

fn prompt<R: BufRead, W: Write>(input: &mut R, out: &mut W) -> Result<Option<String>> {
    write!(out, "> ")?;
    out.flush()?;
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_ascii_lowercase()))
}

fn print_results<W: Write>(
    engine: &QuizEngine,
    catalog: &dyn CatalogProvider,
    out: &mut W,
) -> Result<()> {
    let recommendations = engine.results().unwrap_or_default();
    info!(count = recommendations.len(), "Quiz finished");

    writeln!(out)?;
    if recommendations.is_empty() {
        writeln!(out, "No matching careers found. Try again with different answers.")?;
        return Ok(());
    }
    writeln!(out, "Your top career matches:")?;
    for (rank, rec) in recommendations.iter().enumerate() {
        let Some(career) = catalog.career(rec.tag) else {
            continue;
        };
        writeln!(
            out,
            "  {}. {} ({} matching answers)",
            rank + 1,
            career.title,
            rec.frequency
        )?;
        writeln!(out, "     {}", career.description)?;
        writeln!(out, "     Path: {}", career.education_path)?;
    }
    Ok(())
}
