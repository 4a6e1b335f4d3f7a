use std::io::{self, Write};
use std::time::Duration;

use console_input::ConsoleInput;

fn main() -> console_input::Result<()> {
    let mut input = ConsoleInput::new()?;

    print!("Name: ");
    io::stdout().flush()?;
    let name = input.read()?.unwrap_or_default();

    print!("Password: ");
    io::stdout().flush()?;
    match input.read_hidden()? {
        Some(password) => println!("\nGot {} characters.", password.trim_end().chars().count()),
        None => println!("\nHidden input is not supported on this platform."),
    }

    println!("Hello, {}! Type something within 5 seconds...", name.trim_end());
    if input.data_available(Duration::from_secs(5))? {
        println!("You typed: {:?}", input.read()?);
    } else {
        println!("Nothing typed.");
    }

    Ok(())
}
