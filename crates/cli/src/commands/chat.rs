//! `lumen chat` — Interactive or single-question mode, in process.

use std::io::Write;
use std::path::Path;

use lumen_agent::{QuizItem, ResponseKind};
use lumen_config::AppConfig;
use lumen_core::message::{ConversationHistory, ConversationTurn};
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};

const GREETING: &str = "Ask anything about the chapter Sound!";

pub async fn run(message: Option<String>) -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;

    // Fail early with setup instructions rather than on the first turn
    if !config.has_api_key() {
        eprintln!();
        eprintln!("  ERROR: No API key configured!");
        eprintln!();
        eprintln!("  Set one of these environment variables:");
        eprintln!("    GROQ_API_KEY=gsk_...     (default provider)");
        eprintln!("    OPENAI_API_KEY=sk-...    (for OpenAI direct)");
        eprintln!("    LUMEN_API_KEY=...        (generic)");
        eprintln!();
        eprintln!("  Or add it to your config file:");
        eprintln!("    {}", AppConfig::config_dir().join("config.toml").display());
        eprintln!();
        return Err("No API key found. See above for setup instructions.".into());
    }

    eprint!("  Loading corpus...");
    let router = lumen_agent::build_turn_router(&config).await?;
    eprint!("\r                  \r");

    let mindmap_path = config.mindmap.image_path();
    let mut stdin = BufReader::new(tokio::io::stdin()).lines();

    if let Some(msg) = message {
        // Single message mode
        let mut history = ConversationHistory::new();
        eprint!("  Thinking...");
        let response = router.handle_turn(&msg, &mut history).await?;
        eprint!("\r              \r");
        present(&response, &mindmap_path, None).await?;
        return Ok(());
    }

    println!();
    println!("  Lumen: Sound chapter study assistant");
    println!();
    println!("  Provider:  {}", config.default_provider);
    println!("  Model:     {}", config.default_model);
    println!("  Vision:    {}", config.vision.model);
    println!();
    println!("  Type your question and press Enter.");
    println!("  Type 'exit' or Ctrl+D to quit.");
    println!();
    println!("  Assistant > {GREETING}");
    println!();

    let mut session = ConversationHistory::new();
    session.push(ConversationTurn::assistant(GREETING));

    loop {
        print!("  You > ");
        std::io::stdout().flush()?;

        let Some(line) = stdin.next_line().await? else {
            break;
        };
        let prompt = line.trim();
        if prompt.is_empty() {
            continue;
        }
        if prompt == "exit" || prompt == "quit" {
            break;
        }

        eprint!("  ...");
        // Each turn works on a copy; the session records only what was said.
        let mut history = session.clone();
        match router.handle_turn(prompt, &mut history).await {
            Ok(response) => {
                eprint!("\r     \r");
                println!();
                present(&response, &mindmap_path, Some(&mut stdin)).await?;
                println!();
                session.push(ConversationTurn::user(prompt));
                session.push(ConversationTurn::assistant(response));
            }
            Err(e) => {
                eprint!("\r     \r");
                eprintln!("  [Error] {e}");
                println!();
                session.push(ConversationTurn::user(prompt));
            }
        }
    }

    println!();
    println!("  Goodbye!");
    println!();
    Ok(())
}

/// Show a response the way its kind calls for. With `input`, a quiz waits
/// for the student's pick before revealing the answer.
async fn present(
    response: &str,
    mindmap_path: &Path,
    input: Option<&mut Lines<BufReader<Stdin>>>,
) -> Result<(), Box<dyn std::error::Error>> {
    match ResponseKind::classify(response) {
        ResponseKind::Mindmap => {
            println!("  Assistant > {response}");
            println!("  Mindmap image: {}", mindmap_path.display());
        }
        ResponseKind::Quiz(item) => {
            println!("{}", quiz_question(&item));
            let pick = match input {
                Some(lines) => {
                    print!("  Your answer (1-{}) > ", item.choices.len());
                    std::io::stdout().flush()?;
                    lines
                        .next_line()
                        .await?
                        .and_then(|l| l.trim().parse::<usize>().ok())
                }
                None => None,
            };
            println!("{}", quiz_reveal(&item, pick));
        }
        ResponseKind::Text(text) => {
            for line in text.lines() {
                println!("  Assistant > {line}");
            }
        }
    }
    Ok(())
}

fn quiz_question(item: &QuizItem) -> String {
    let mut out = format!("  Question: {}\n", item.question);
    for (i, choice) in item.choices.iter().enumerate() {
        out.push_str(&format!("    {}. {choice}\n", i + 1));
    }
    out
}

/// `pick` is the 1-based choice number the student entered, if any.
fn quiz_reveal(item: &QuizItem, pick: Option<usize>) -> String {
    let verdict = match (pick, item.answer_index()) {
        (Some(p), Some(a)) if p == a + 1 => "  Correct!\n",
        (Some(_), _) => "  Not quite.\n",
        (None, _) => "",
    };
    format!(
        "{verdict}  Here's the answer: {}\n  Here's the explanation: {}",
        item.answer, item.explanation
    )
}
