use clap::{Parser, Subcommand, ValueEnum};

pub mod handlers;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum SortArg {
    /// Newest first
    Date,
    /// By subject name
    Subject,
}

#[derive(Subcommand, Debug, Clone)]
pub enum SubjectArgs {
    /// List subjects
    List {},
    /// Create a subject
    Add {
        /// Subject name
        name: String,
    },
    /// Delete a subject
    Delete {
        /// Subject id
        id: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Serve the REST API.
    Daemon {},

    /// List notes
    List {
        /// Sort order
        #[clap(short, long, value_enum)]
        sort: Option<SortArg>,

        /// Only notes under this subject
        #[clap(short = 'S', long)]
        subject: Option<String>,

        /// Case-insensitive pattern matched against title and body
        #[clap(short = 'q', long)]
        search: Option<String>,
    },

    /// Print a note
    Show {
        /// Note id
        id: String,
    },

    /// Create a note. Without --subject the subject is suggested.
    Add {
        /// Note title
        #[clap(short, long)]
        title: String,

        /// Note body
        #[clap(short, long)]
        body: Option<String>,

        /// Note subject
        #[clap(short, long)]
        subject: Option<String>,
    },

    /// Edit a note. An uncategorized note gets a suggested subject.
    Edit {
        /// Note id
        id: String,

        /// New title
        #[clap(short, long)]
        title: Option<String>,

        /// New body
        #[clap(short, long)]
        body: Option<String>,

        /// New subject
        #[clap(short, long)]
        subject: Option<String>,
    },

    /// Delete a note
    Delete {
        /// Note id
        id: String,

        /// Auto confirm
        #[clap(short, long, default_value = "false")]
        yes: bool,
    },

    /// Print the subject suggested for some text
    Suggest {
        /// Candidate title
        #[clap(short, long, default_value = "")]
        title: String,

        /// Candidate body
        #[clap(short, long, default_value = "")]
        body: String,

        /// Id of the note the text belongs to
        #[clap(long)]
        id: Option<String>,
    },

    /// Write a note line by line from stdin, with live subject suggestions.
    /// The note is saved at end of input.
    Compose {
        /// Note title (required for a new note)
        #[clap(short, long)]
        title: Option<String>,

        /// Continue an existing note
        #[clap(long)]
        id: Option<String>,
    },

    /// Suggest subjects for every uncategorized note
    Recategorize {
        /// Auto confirm
        #[clap(short, long, default_value = "false")]
        yes: bool,
    },

    /// Manage subjects
    Subject {
        #[clap(subcommand)]
        action: SubjectArgs,
    },
}
