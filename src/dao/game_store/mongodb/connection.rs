use std::time::Duration;

use mongodb::{Client, Database, bson::doc, options::ClientOptions};
use tokio::time::sleep;
use tracing::debug;

use super::error::{MongoDaoError, MongoResult};

const PING_ATTEMPTS: u32 = 10;
const FIRST_PING_DELAY: Duration = Duration::from_millis(250);
const MAX_PING_DELAY: Duration = Duration::from_secs(5);

/// Build a client for the given options and ping the target database until it
/// answers, backing off between attempts.
pub async fn establish_connection(
    options: &ClientOptions,
    database_name: &str,
) -> MongoResult<(Client, Database)> {
    let client = Client::with_options(options.clone())
        .map_err(|source| MongoDaoError::ClientConstruction { source })?;
    let database = client.database(database_name);

    ping_until_ready(&database).await?;
    Ok((client, database))
}

async fn ping_until_ready(database: &Database) -> MongoResult<()> {
    let mut delay = FIRST_PING_DELAY;

    for attempt in 1..=PING_ATTEMPTS {
        match database.run_command(doc! { "ping": 1 }).await {
            Ok(_) => return Ok(()),
            Err(err) if attempt == PING_ATTEMPTS => {
                return Err(MongoDaoError::InitialPing {
                    attempts: attempt,
                    source: err,
                });
            }
            Err(err) => {
                debug!(attempt, error = %err, "MongoDB ping failed, retrying");
                sleep(delay).await;
                delay = (delay * 2).min(MAX_PING_DELAY);
            }
        }
    }

    // The loop always returns on the final attempt.
    Ok(())
}
