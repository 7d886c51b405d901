use anyhow::Context;
use inquire::{InquireError, Text};
use skycast_core::{Completion, FileSlot, Session};

use crate::render;

/// One line of user input at the search prompt.
#[derive(Debug, PartialEq, Eq)]
enum Input<'a> {
    Search(&'a str),
    ToggleUnit,
    History,
    Quit,
    Blank,
}

fn parse_input(line: &str) -> Input<'_> {
    match line.trim() {
        "" => Input::Blank,
        ":unit" | ":u" => Input::ToggleUnit,
        ":history" | ":h" => Input::History,
        ":quit" | ":q" => Input::Quit,
        city => Input::Search(city),
    }
}

pub async fn run(mut session: Session<FileSlot>) -> anyhow::Result<()> {
    println!("Enter a city, or :unit, :history, :quit.");
    print!("{}", render::history(session.history(), session.unit()));

    loop {
        let prompt = format!("City [{}]", session.unit().symbol());
        let line = match Text::new(&prompt).prompt() {
            Ok(line) => line,
            Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => break,
            Err(err) => return Err(err).context("Failed to read input"),
        };

        match parse_input(&line) {
            Input::Blank => continue,
            Input::Quit => break,
            Input::History => print!("{}", render::history(session.history(), session.unit())),
            Input::ToggleUnit => {
                let unit = session.toggle_unit();
                println!("Showing temperatures in {unit}.");
                if session.displayed().is_some() {
                    print!("{}", render::session(&session));
                }
            }
            Input::Search(city) => match session.search(city).await {
                Completion::Applied | Completion::Stale => print!("{}", render::session(&session)),
                Completion::Failed(err) => println!("Weather unavailable for '{city}': {err}"),
            },
        }
    }

    Ok(())
}
