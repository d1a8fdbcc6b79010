use std::process;

use clap::{Parser, Subcommand};

use keylex_cli::commands::{dict_ops, googlengram, wiktextract, wordlist};
use keylex_cli::trace;

#[derive(Parser)]
#[command(name = "fldictool", about = "Keylex dictionary build and query tool")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Build an fldic dictionary from a wiktextract JSON dump (kaikki.org)
    PrepWiktextract {
        /// Source wiktextract JSON file
        #[arg(long)]
        src: String,
        /// Destination fldic file (overwritten if present)
        #[arg(long)]
        dst: String,
        /// Preprocessor config file
        #[arg(long, default_value = wiktextract::DEFAULT_CONFIG_PATH)]
        config: String,
        /// Filter name from the config
        #[arg(long, default_value = wiktextract::DEFAULT_FILTER_NAME)]
        filter: String,
        /// Where to write parse statistics (omit to skip)
        #[arg(long)]
        stats: Option<String>,
    },
    /// Build an fldic dictionary from a Google Books v3 unigram directory
    PrepGooglengram {
        /// Directory with the totalcounts-1 file and partition files
        #[arg(long)]
        src: String,
        /// Destination fldic file (overwritten if present)
        #[arg(long)]
        dst: String,
        /// A single partition file name to load (default: all partitions)
        #[arg(long)]
        partition: Option<String>,
    },
    /// Build an fldic dictionary from a ranked word list (Wortschatz corpora)
    PrepWordlist {
        /// Source word list (rank<TAB>word<TAB>frequency per line)
        #[arg(long)]
        src: String,
        /// Destination fldic file (overwritten if present)
        #[arg(long)]
        dst: String,
    },
    /// Show dictionary header and n-gram counts
    Info {
        /// Dictionary (.fldic) file
        dict_file: String,
    },
    /// Look up the properties of an n-gram (1 to 3 words)
    Lookup {
        /// Dictionary (.fldic) file
        dict_file: String,
        /// Words forming the n-gram chain
        #[arg(required = true, num_args = 1..=3)]
        words: Vec<String>,
    },
    /// Spell-check a single word
    Spell {
        /// Dictionary (.fldic) file
        dict_file: String,
        /// Word to check
        word: String,
        /// Maximum number of suggestions
        #[arg(long, default_value = "8")]
        max: u8,
        /// Include possibly offensive suggestions
        #[arg(long)]
        allow_offensive: bool,
        /// Key proximity JSON file
        #[arg(long)]
        proximity: Option<String>,
    },
    /// Print ranked suggestions for a word
    Suggest {
        /// Dictionary (.fldic) file
        dict_file: String,
        /// Word to complete or correct
        word: String,
        /// Maximum number of suggestions
        #[arg(long, default_value = "8")]
        max: u8,
        /// Include possibly offensive suggestions
        #[arg(long)]
        allow_offensive: bool,
        /// Key proximity JSON file
        #[arg(long)]
        proximity: Option<String>,
    },
}

fn main() {
    trace::init();
    let cli = Cli::parse();

    let code = match cli.command {
        Command::PrepWiktextract {
            src,
            dst,
            config,
            filter,
            stats,
        } => wiktextract::prep_wiktextract(&src, &dst, &config, &filter, stats.as_deref()),
        Command::PrepGooglengram { src, dst, partition } => {
            googlengram::prep_googlengram(&src, &dst, partition.as_deref())
        }
        Command::PrepWordlist { src, dst } => wordlist::prep_wordlist(&src, &dst),
        Command::Info { dict_file } => dict_ops::info(&dict_file),
        Command::Lookup { dict_file, words } => dict_ops::lookup(&dict_file, &words),
        Command::Spell {
            dict_file,
            word,
            max,
            allow_offensive,
            proximity,
        } => dict_ops::spell(&dict_file, &word, max, allow_offensive, proximity.as_deref()),
        Command::Suggest {
            dict_file,
            word,
            max,
            allow_offensive,
            proximity,
        } => dict_ops::suggest(&dict_file, &word, max, allow_offensive, proximity.as_deref()),
    };
    process::exit(code);
}
