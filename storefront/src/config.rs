//! Command-line configuration for the `mercari` binary.
//!
//! Precedence: CLI flag, then environment variable, then default.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use mercari_core::{ItemFeed, ItemId, UserId};

pub const DEFAULT_SERVER: &str = "http://127.0.0.1:9000";
pub const DEFAULT_COOKIES: &str = ".mercari-cookies.json";

#[derive(Parser, Debug)]
#[command(name = "mercari")]
#[command(about = "Terminal storefront for the Simple Mercari marketplace")]
#[command(version)]
pub struct Cli {
    /// Base address of the marketplace API
    #[arg(long, short = 's', default_value = DEFAULT_SERVER, env = "MERCARI_SERVER")]
    pub server: String,

    /// File holding the session cookies
    #[arg(long, short = 'c', default_value = DEFAULT_COOKIES, env = "MERCARI_COOKIES")]
    pub cookies: PathBuf,

    /// Debug-level logging (overridden by MERCARI_LOG / RUST_LOG)
    #[arg(long, short = 'v')]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create an account and sign in with it
    Signup { name: String, password: String },
    /// Sign in by user id, or by user name with --name
    Login {
        user: String,
        password: String,
        #[arg(long)]
        name: bool,
    },
    /// Forget the stored session
    Logout,
    /// Show the item feed
    Home {
        #[arg(long, value_enum, default_value = "on-sale")]
        feed: FeedArg,
    },
    /// Show one item
    Item {
        id: ItemId,
        /// Write the item image to this file
        #[arg(long)]
        save_image: Option<PathBuf>,
    },
    /// Buy an item
    Purchase { id: ItemId },
    /// List a new item and put it on sale
    Sell {
        name: String,
        #[arg(long)]
        price: i64,
        #[arg(long, default_value_t = 1)]
        category: i64,
        #[arg(long, default_value = "")]
        description: String,
        /// Image file to upload
        #[arg(long)]
        image: PathBuf,
        /// Ask the server to write the description
        #[arg(long)]
        suggest: bool,
    },
    /// List item categories
    Categories,
    /// Generate a description for an item name
    Describe {
        name: String,
        #[arg(default_value = "")]
        description: String,
    },
    /// Show a user's items and your balance
    Profile { user_id: Option<UserId> },
    /// Add to your balance
    Balance { amount: i64 },
    /// Search items by name; repeats the last search when no keyword is given
    Search { keyword: Option<String> },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FeedArg {
    OnSale,
    WithSoldOut,
    All,
}

impl From<FeedArg> for ItemFeed {
    fn from(arg: FeedArg) -> Self {
        match arg {
            FeedArg::OnSale => ItemFeed::OnSale,
            FeedArg::WithSoldOut => ItemFeed::WithSoldOut,
            FeedArg::All => ItemFeed::All,
        }
    }
}
