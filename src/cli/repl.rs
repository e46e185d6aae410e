//! Interactive command loop
//!
//! Reads line-based commands from the input, drives the marketplace engine,
//! and prints human-readable results. Every failure is printed and the loop
//! continues; nothing here terminates the process.
//!
//! Commands are accepted in two forms: a command word (`login`, `logout`,
//! `create`, `delete`, `sell`, `buy`, `refund`, `addcredit`, `list`,
//! `exit`) or the equivalent numeric menu choice 1-10, followed by the
//! command's arguments on the same line. Game titles may contain spaces, so
//! commands taking a title read it greedily up to the trailing fixed
//! arguments (`sell Space Truckers 59.99`).

use crate::core::{Marketplace, Session};
use crate::types::{MarketError, UserType};
use rust_decimal::Decimal;
use std::io::{self, BufRead, Write};
use std::str::FromStr;

/// One parsed command line
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Login { username: String },
    Logout,
    Create {
        username: String,
        user_type: UserType,
        credit: Decimal,
    },
    Delete { username: String },
    Sell { game: String, price: Decimal },
    Buy { game: String, seller: String },
    Refund {
        buyer: String,
        seller: String,
        amount: Decimal,
    },
    AddCredit { amount: Decimal },
    ListAccounts,
    ListGames,
    Help,
    Exit,
}

const MENU: &str = "\
Commands (word or menu number):
  1  login <username>
  2  logout
  3  create <username> <AA|FS|BS|SS> <credit>
  4  delete <username>
  5  sell <game title> <price>
  6  buy <game title> <seller>
  7  refund <buyer> <seller> <amount>
  8  addcredit <amount>
  9  list [games]
  10 exit";

/// Parse one input line into a command
///
/// The first token may be a command word or its numeric menu choice.
pub fn parse_line(line: &str) -> Result<Command, MarketError> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    let Some((&head, args)) = tokens.split_first() else {
        return Err(MarketError::UnknownCommand {
            input: line.to_string(),
        });
    };

    let word = match head {
        "1" => "login",
        "2" => "logout",
        "3" => "create",
        "4" => "delete",
        "5" => "sell",
        "6" => "buy",
        "7" => "refund",
        "8" => "addcredit",
        "9" => "list",
        "10" => "exit",
        other => other,
    };

    match word {
        "login" => match args {
            [username] => Ok(Command::Login {
                username: username.to_string(),
            }),
            _ => Err(MarketError::BadUsage {
                usage: "login <username>",
            }),
        },
        "logout" => Ok(Command::Logout),
        "create" => match args {
            [username, code, credit] => Ok(Command::Create {
                username: username.to_string(),
                user_type: UserType::from_code(code).ok_or(MarketError::BadUsage {
                    usage: "create <username> <AA|FS|BS|SS> <credit>",
                })?,
                credit: parse_amount(credit, "create <username> <AA|FS|BS|SS> <credit>")?,
            }),
            _ => Err(MarketError::BadUsage {
                usage: "create <username> <AA|FS|BS|SS> <credit>",
            }),
        },
        "delete" => match args {
            [username] => Ok(Command::Delete {
                username: username.to_string(),
            }),
            _ => Err(MarketError::BadUsage {
                usage: "delete <username>",
            }),
        },
        "sell" => {
            // Greedy title: everything up to the trailing price.
            let [title @ .., price] = args else {
                return Err(MarketError::BadUsage {
                    usage: "sell <game title> <price>",
                });
            };
            if title.is_empty() {
                return Err(MarketError::BadUsage {
                    usage: "sell <game title> <price>",
                });
            }
            Ok(Command::Sell {
                game: title.join(" "),
                price: parse_amount(price, "sell <game title> <price>")?,
            })
        }
        "buy" => {
            let [title @ .., seller] = args else {
                return Err(MarketError::BadUsage {
                    usage: "buy <game title> <seller>",
                });
            };
            if title.is_empty() {
                return Err(MarketError::BadUsage {
                    usage: "buy <game title> <seller>",
                });
            }
            Ok(Command::Buy {
                game: title.join(" "),
                seller: seller.to_string(),
            })
        }
        "refund" => match args {
            [buyer, seller, amount] => Ok(Command::Refund {
                buyer: buyer.to_string(),
                seller: seller.to_string(),
                amount: parse_amount(amount, "refund <buyer> <seller> <amount>")?,
            }),
            _ => Err(MarketError::BadUsage {
                usage: "refund <buyer> <seller> <amount>",
            }),
        },
        "addcredit" => match args {
            [amount] => Ok(Command::AddCredit {
                amount: parse_amount(amount, "addcredit <amount>")?,
            }),
            _ => Err(MarketError::BadUsage {
                usage: "addcredit <amount>",
            }),
        },
        "list" => match args {
            [] => Ok(Command::ListAccounts),
            ["games"] | ["inventory"] => Ok(Command::ListGames),
            _ => Err(MarketError::BadUsage {
                usage: "list [games]",
            }),
        },
        // The long form used by older front ends.
        "display" if args == ["all", "accounts"] => Ok(Command::ListAccounts),
        "help" => Ok(Command::Help),
        "exit" | "quit" => Ok(Command::Exit),
        _ => Err(MarketError::UnknownCommand {
            input: line.trim().to_string(),
        }),
    }
}

fn parse_amount(raw: &str, usage: &'static str) -> Result<Decimal, MarketError> {
    Decimal::from_str(raw).map_err(|_| MarketError::BadUsage { usage })
}

/// Drive the marketplace from a line-based input until exit or end-of-input
///
/// Only I/O errors on the output itself abort the loop; every market error
/// is printed and the loop continues. The transaction log is flushed on
/// logout and once more on exit.
pub fn run<R: BufRead, W: Write>(
    market: &mut Marketplace,
    input: R,
    output: &mut W,
) -> io::Result<()> {
    writeln!(output, "{MENU}")?;

    let mut session: Option<Session> = None;

    for line in input.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        match parse_line(&line) {
            Ok(Command::Exit) => break,
            Ok(command) => {
                if let Err(e) = dispatch(market, &mut session, command, output)? {
                    writeln!(output, "error: {e}")?;
                }
            }
            Err(e) => writeln!(output, "error: {e}")?,
        }
    }

    // End-of-input behaves like exit: close any open session and flush.
    if let Some(session) = session.take() {
        if let Err(e) = market.logout(session) {
            writeln!(output, "error: {e}")?;
        }
    }
    if let Err(e) = market.flush_log() {
        writeln!(output, "error: {e}")?;
    }
    Ok(())
}

/// Execute one command, reporting market errors as values
///
/// The outer `io::Result` covers failures writing to the output; the inner
/// result carries the business failure, printed by the caller.
fn dispatch<W: Write>(
    market: &mut Marketplace,
    session: &mut Option<Session>,
    command: Command,
    output: &mut W,
) -> io::Result<Result<(), MarketError>> {
    match command {
        Command::Help => {
            writeln!(output, "{MENU}")?;
        }
        Command::Login { username } => {
            if session.is_some() {
                writeln!(output, "error: already logged in; logout first")?;
                return Ok(Ok(()));
            }
            match market.login(&username) {
                Ok(new_session) => {
                    writeln!(
                        output,
                        "welcome {} ({})",
                        new_session.username,
                        new_session.user_type.display_name()
                    )?;
                    *session = Some(new_session);
                }
                Err(e) => return Ok(Err(e)),
            }
        }
        Command::Logout => match session.take() {
            Some(active) => {
                let username = active.username.clone();
                if let Err(e) = market.logout(active) {
                    return Ok(Err(e));
                }
                writeln!(output, "goodbye {username}")?;
            }
            None => writeln!(output, "error: no user is logged in")?,
        },
        Command::Create {
            username,
            user_type,
            credit,
        } => match require_session(session) {
            Ok(active) => match market.create_user(active, &username, user_type, credit) {
                Ok(user) => writeln!(
                    output,
                    "created {} ({})",
                    user.username,
                    user.user_type.display_name()
                )?,
                Err(e) => return Ok(Err(e)),
            },
            Err(e) => return Ok(Err(e)),
        },
        Command::Delete { username } => match require_session(session) {
            Ok(active) => match market.delete_user(active, &username) {
                Ok(()) => writeln!(output, "deleted {username}")?,
                Err(e) => return Ok(Err(e)),
            },
            Err(e) => return Ok(Err(e)),
        },
        Command::Sell { game, price } => match require_session(session) {
            Ok(active) => match market.sell(active, &game, price) {
                Ok(listing) => writeln!(
                    output,
                    "listed '{}' at {:.2}",
                    listing.game_name, listing.price
                )?,
                Err(e) => return Ok(Err(e)),
            },
            Err(e) => return Ok(Err(e)),
        },
        Command::Buy { game, seller } => match require_session(session) {
            Ok(active) => match market.buy(active, &game, &seller) {
                Ok(listing) => writeln!(
                    output,
                    "bought '{}' from {} for {:.2}",
                    listing.game_name, listing.seller, listing.price
                )?,
                Err(e) => return Ok(Err(e)),
            },
            Err(e) => return Ok(Err(e)),
        },
        Command::Refund {
            buyer,
            seller,
            amount,
        } => match require_session(session) {
            Ok(active) => match market.refund(active, &buyer, &seller, amount) {
                Ok(()) => writeln!(output, "refunded {amount:.2} from {seller} to {buyer}")?,
                Err(e) => return Ok(Err(e)),
            },
            Err(e) => return Ok(Err(e)),
        },
        Command::AddCredit { amount } => match session.as_mut() {
            Some(active) => match market.add_credit(active, amount) {
                Ok(balance) => writeln!(output, "new balance: {balance:.2}")?,
                Err(e) => return Ok(Err(e)),
            },
            None => writeln!(output, "error: no user is logged in")?,
        },
        Command::ListAccounts => match require_session(session) {
            Ok(active) => match market.list_users(active) {
                Ok(users) => {
                    for user in users {
                        writeln!(
                            output,
                            "{:<16} {:<13} {:>9.2}",
                            user.username,
                            user.user_type.display_name(),
                            user.credit
                        )?;
                    }
                }
                Err(e) => return Ok(Err(e)),
            },
            Err(e) => return Ok(Err(e)),
        },
        Command::ListGames => match market.list_inventory() {
            Ok(listings) => {
                for listing in listings {
                    writeln!(
                        output,
                        "{:<26} {:<16} {:>6.2}",
                        listing.game_name, listing.seller, listing.price
                    )?;
                }
            }
            Err(e) => return Ok(Err(e)),
        },
        // Exit is handled by the caller before dispatch.
        Command::Exit => {}
    }
    Ok(Ok(()))
}

fn require_session(session: &Option<Session>) -> Result<&Session, MarketError> {
    session.as_ref().ok_or(MarketError::BadUsage {
        usage: "login <username> first",
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::io::Cursor;
    use tempfile::TempDir;

    #[rstest]
    #[case::word("login alice", Command::Login { username: "alice".to_string() })]
    #[case::numeric("1 alice", Command::Login { username: "alice".to_string() })]
    #[case::logout("logout", Command::Logout)]
    #[case::logout_numeric("2", Command::Logout)]
    #[case::exit("exit", Command::Exit)]
    #[case::exit_numeric("10", Command::Exit)]
    #[case::list("list", Command::ListAccounts)]
    #[case::list_long_form("display all accounts", Command::ListAccounts)]
    #[case::list_games("list games", Command::ListGames)]
    #[case::addcredit("addcredit 25.00", Command::AddCredit { amount: Decimal::new(2500, 2) })]
    fn test_parse_simple_commands(#[case] line: &str, #[case] expected: Command) {
        assert_eq!(parse_line(line).unwrap(), expected);
    }

    #[test]
    fn test_parse_create() {
        assert_eq!(
            parse_line("create bob FS 100.00").unwrap(),
            Command::Create {
                username: "bob".to_string(),
                user_type: UserType::FullStandard,
                credit: Decimal::new(10000, 2),
            }
        );
    }

    #[test]
    fn test_parse_sell_with_multi_word_title() {
        assert_eq!(
            parse_line("sell Space Truckers 59.99").unwrap(),
            Command::Sell {
                game: "Space Truckers".to_string(),
                price: Decimal::new(5999, 2),
            }
        );
    }

    #[test]
    fn test_parse_buy_with_multi_word_title() {
        assert_eq!(
            parse_line("6 Space Truckers bob").unwrap(),
            Command::Buy {
                game: "Space Truckers".to_string(),
                seller: "bob".to_string(),
            }
        );
    }

    #[rstest]
    #[case::unknown_word("frobnicate now")]
    #[case::unknown_number("11")]
    fn test_parse_unknown_command(#[case] line: &str) {
        assert!(matches!(
            parse_line(line),
            Err(MarketError::UnknownCommand { .. })
        ));
    }

    #[rstest]
    #[case::login_no_arg("login")]
    #[case::create_missing_credit("create bob FS")]
    #[case::create_bad_code("create bob ZZ 1.00")]
    #[case::create_bad_amount("create bob FS abc")]
    #[case::sell_no_price("sell")]
    #[case::refund_missing("refund bob 1.00")]
    fn test_parse_bad_usage(#[case] line: &str) {
        assert!(matches!(parse_line(line), Err(MarketError::BadUsage { .. })));
    }

    /// Full loop over an in-memory script: admin creates users, a sale and a
    /// purchase happen, and the loop survives bad input in between.
    #[test]
    fn test_run_script_end_to_end() {
        let dir = TempDir::new().unwrap();
        let accounts = dir.path().join("accounts.txt");
        let log = dir.path().join("daily.txt");
        let mut market = Marketplace::open(
            &accounts,
            dir.path().join("inventory.txt"),
            dir.path().join("ownership.txt"),
            &log,
        );

        // Seed an admin directly through the store layer.
        let admin = crate::types::UserRecord::new(
            "admin",
            UserType::Admin,
            Decimal::ZERO,
        );
        let store: crate::core::RecordStore<crate::types::UserRecord> =
            crate::core::RecordStore::open(&accounts);
        store.append(&admin).unwrap();

        let script = "\
login admin
create seller SS 0.00
create buyer BS 100.00
logout
login seller
sell Space Truckers 59.99
logout
login buyer
nonsense command
buy Space Truckers seller
logout
exit
";
        let mut output = Vec::new();
        run(&mut market, Cursor::new(script), &mut output).unwrap();
        let output = String::from_utf8(output).unwrap();

        assert!(output.contains("welcome admin (Admin)"));
        assert!(output.contains("listed 'Space Truckers' at 59.99"));
        assert!(output.contains("bought 'Space Truckers' from seller for 59.99"));
        assert!(output.contains("error: unrecognized command 'nonsense command'"));

        let log_contents = std::fs::read_to_string(&log).unwrap();
        assert!(log_contents.contains("01 seller__________ SS 000000.00"));
        assert!(log_contents.contains("04 Space Truckers____________"));
        assert!(log_contents.contains("07 seller__________ buyer___________ 000059.99"));
    }

    #[test]
    fn test_run_requires_login_for_mutations() {
        let dir = TempDir::new().unwrap();
        let mut market = Marketplace::open(
            dir.path().join("accounts.txt"),
            dir.path().join("inventory.txt"),
            dir.path().join("ownership.txt"),
            dir.path().join("daily.txt"),
        );

        let mut output = Vec::new();
        run(
            &mut market,
            Cursor::new("sell Chess 1.00\nexit\n"),
            &mut output,
        )
        .unwrap();

        let output = String::from_utf8(output).unwrap();
        assert!(output.contains("error: usage: login <username> first"));
    }
}
