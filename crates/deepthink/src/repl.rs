//! Interactive terminal session.
//!
//! Owns the line editor, the conversation, and the turn flow: a buffered
//! analysis pass rendered when complete, then a streamed answer pass that
//! is accumulated and rendered once the stream finishes. Ctrl-C during a
//! request cancels that request only; at the prompt, a second consecutive
//! Ctrl-C exits.

use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use chat_api::{CancellationSignal, ChatApiError};
use log::{info, warn};
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use signal_hook::iterator::Signals;
use streamdown::style::{bold, cyan, dim, green, magenta, red, yellow};
use streamdown::{separator, RenderSink, StreamRenderer, TerminalSink};
use thiserror::Error;

use crate::app::Conversation;
use crate::commands::{parse_slash_command, SlashCommand};
use crate::pipeline::Pipeline;

const PROMPT: &str = ">> ";

#[derive(Debug, Error)]
pub enum ReplError {
    #[error("line editor error: {source}")]
    Editor {
        #[source]
        source: ReadlineError,
    },

    #[error("failed to start the async runtime: {source}")]
    Runtime {
        #[source]
        source: io::Error,
    },

    #[error("failed to install the interrupt handler: {source}")]
    Interrupt {
        #[source]
        source: io::Error,
    },
}

/// Bridges SIGINT onto a shared cancellation flag.
///
/// rustyline reports Ctrl-C at the prompt itself; this guard covers the
/// in-flight request window, where the default disposition would kill the
/// process instead of cancelling the request.
struct InterruptGuard {
    signal: CancellationSignal,
    handle: signal_hook::iterator::Handle,
    thread: Option<JoinHandle<()>>,
}

impl InterruptGuard {
    fn install() -> io::Result<Self> {
        let signal: CancellationSignal = Arc::new(AtomicBool::new(false));
        let mut signals = Signals::new([libc::SIGINT])?;
        let handle = signals.handle();
        let flag = Arc::clone(&signal);
        let thread = thread::spawn(move || {
            for _ in signals.forever() {
                flag.store(true, Ordering::Release);
            }
        });

        Ok(Self {
            signal,
            handle,
            thread: Some(thread),
        })
    }

    fn signal(&self) -> &CancellationSignal {
        &self.signal
    }

    /// Clears a leftover interrupt before a new request begins.
    fn reset(&self) {
        self.signal.store(false, Ordering::Release);
    }
}

impl Drop for InterruptGuard {
    fn drop(&mut self) {
        self.handle.close();
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

/// Terminal session driving the two-stage pipeline.
pub struct Repl {
    editor: DefaultEditor,
    runtime: tokio::runtime::Runtime,
    renderer: StreamRenderer<TerminalSink>,
    pipeline: Pipeline,
    conversation: Conversation,
    interrupt: InterruptGuard,
}

impl Repl {
    pub fn new(pipeline: Pipeline) -> Result<Self, ReplError> {
        let editor = DefaultEditor::new().map_err(|source| ReplError::Editor { source })?;
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|source| ReplError::Runtime { source })?;
        let interrupt =
            InterruptGuard::install().map_err(|source| ReplError::Interrupt { source })?;

        Ok(Self {
            editor,
            runtime,
            renderer: StreamRenderer::new(TerminalSink::new()),
            pipeline,
            conversation: Conversation::new(),
            interrupt,
        })
    }

    /// Runs the prompt loop until `/quit`, Ctrl-D, or a double Ctrl-C.
    pub fn run(&mut self) -> Result<(), ReplError> {
        print_welcome();
        info!("session started, model {}", self.pipeline.model());

        let mut pending_exit = false;
        loop {
            match self.editor.readline(PROMPT) {
                Ok(line) => {
                    pending_exit = false;
                    let input = line.trim();
                    if input.is_empty() {
                        continue;
                    }
                    let _ = self.editor.add_history_entry(line.as_str());

                    match parse_slash_command(input) {
                        Some(SlashCommand::NewConversation) => self.reset_conversation(),
                        Some(SlashCommand::Help) => print_help(),
                        Some(SlashCommand::Quit) => break,
                        Some(SlashCommand::Unknown(command)) => {
                            println!(
                                "Unknown command: {command}. Type {} for the list.",
                                cyan("/help")
                            );
                        }
                        None => self.run_turn(input),
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    if pending_exit {
                        break;
                    }
                    pending_exit = true;
                    println!("{}", red("🛑 Press Ctrl+C again to exit."));
                }
                Err(ReadlineError::Eof) => break,
                Err(source) => return Err(ReplError::Editor { source }),
            }
        }

        info!("session ended after {} rounds", self.conversation.rounds());
        println!("\n👋 Goodbye!");
        Ok(())
    }

    fn reset_conversation(&mut self) {
        self.conversation.reset();
        clear_screen();
        println!("{}", cyan("🌟 Context reset. Starting a fresh conversation."));
        info!("conversation reset");
    }

    /// One full question: think, render the analysis, stream the answer,
    /// record the turn, and print the summary line.
    fn run_turn(&mut self, question: &str) {
        self.interrupt.reset();
        let width = self.renderer.sink().width();

        println!("\n{}", yellow("🤔 Thinking deeply..."));
        info!("think stage started");

        let think = self.runtime.block_on(self.pipeline.think(
            self.conversation.messages(),
            question,
            Some(self.interrupt.signal()),
        ));
        let outcome = match think {
            Ok(outcome) => outcome,
            Err(ChatApiError::Cancelled) => {
                info!("think stage cancelled");
                println!("\n{}", red("🛑 Cancelled."));
                return;
            }
            Err(error) => {
                warn!("think stage failed: {error}");
                println!("\n{}", red(&format!("❌ Analysis failed: {error}")));
                return;
            }
        };
        info!(
            "think stage finished in {}",
            format_duration(outcome.elapsed)
        );

        println!("\n{}\n", separator("Thinking", width));
        self.renderer.render(&outcome.analysis);
        println!(
            "\n{}",
            dim(&format!(
                "🔍 Deep thinking took {}",
                format_duration(outcome.elapsed)
            ))
        );

        println!("\n{}\n", separator("Answer", width));
        let answer_started = Instant::now();
        let mut streamed = String::new();
        let result = self.runtime.block_on(self.pipeline.answer(
            self.conversation.messages(),
            &outcome.analysis,
            question,
            Some(self.interrupt.signal()),
            |delta| streamed.push_str(delta),
        ));

        match &result {
            Ok(answer) => {
                self.renderer.render(answer);
                info!("answer stage finished, {} chars", answer.len());
            }
            Err(ChatApiError::Cancelled) => {
                info!("answer stage cancelled after {} chars", streamed.len());
                println!("{}", red("🛑 Cancelled."));
            }
            Err(error) => {
                warn!("answer stage failed after {} chars: {error}", streamed.len());
                if !streamed.is_empty() {
                    self.renderer.render(&streamed);
                }
                println!("\n{}", red(&format!("⚠️ Generation interrupted: {error}")));
            }
        }

        // The turn is recorded with whatever streamed, even after an error.
        if !streamed.is_empty() {
            self.conversation.record_turn(question, &streamed);
        }

        println!("\n{}", "=".repeat(width));
        println!(
            "{} | {} | {}",
            green("✅ Generation complete"),
            dim(&format!("took {}", format_duration(answer_started.elapsed()))),
            dim(&format!("context: {} rounds", self.conversation.rounds()))
        );
    }
}

fn print_welcome() {
    println!(
        "{}",
        bold(&magenta(
            "👋 Welcome to DeepThink!\nType @new to clear the context and start a fresh conversation.",
        ))
    );
    println!(
        "{}",
        dim("Commands: /help, /new, /quit. Ctrl+C cancels a request; Ctrl+D exits.")
    );
}

fn print_help() {
    println!(
        r#"
Commands:
  /help, /?            Show this help message
  /new, /clear, @new   Reset the conversation context
  /quit, /exit, /q     Exit

Keys:
  Ctrl+C               Cancel the in-flight request; twice at the prompt exits
  Ctrl+D               Exit

Anything else runs the two-stage pipeline: a buffered analysis pass
first, then the streamed answer grounded in it.
"#
    );
}

/// ANSI clear plus cursor home, flushed immediately.
fn clear_screen() {
    print!("\x1b[2J\x1b[1;1H");
    let _ = io::stdout().flush();
}

/// Sub-second durations render as whole milliseconds, longer ones as
/// seconds with two decimals.
#[must_use]
pub fn format_duration(elapsed: Duration) -> String {
    let seconds = elapsed.as_secs_f64();
    if seconds >= 1.0 {
        format!("{seconds:.2}s")
    } else {
        format!("{:.0}ms", seconds * 1000.0)
    }
}
