//! Interactive input for the first-time authorization flow.

use crate::error::AppError;
use tokio::io::{self, AsyncBufReadExt};

/// Shows the authorization URL and reads the verifier code the user pastes
/// back. Returns the trimmed code.
///
/// # Example
/// ```no_run
/// use yahoo_fantasy::config::user_prompts::prompt_for_verifier_code;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let code = prompt_for_verifier_code("https://api.login.yahoo.com/oauth2/request_auth?...").await?;
/// println!("Got code: {code}");
/// # Ok(())
/// # }
/// ```
pub async fn prompt_for_verifier_code(authorization_url: &str) -> Result<String, AppError> {
    println!("Open the following URL in a browser and grant access:");
    println!("{authorization_url}");
    println!("Then enter the verifier code: ");
    let mut input = String::new();
    let stdin = io::stdin();
    let mut reader = io::BufReader::new(stdin);
    reader.read_line(&mut input).await?;

    let code = input.trim().to_string();
    if code.is_empty() {
        return Err(AppError::credentials_error("No verifier code entered"));
    }
    Ok(code)
}
