use clap::{Parser, Subcommand};

/// Command-line interface definition for SiteLedger
/// CLI application to track construction-site wages with SQLite
#[derive(Parser)]
#[command(
    name = "siteledger",
    version = env!("CARGO_PKG_VERSION"),
    about = "A construction-site wage ledger: attendance, accrued wages and payments in SQLite",
    long_about = None
)]
pub struct Cli {
    /// Override database path (useful for tests or custom DB)
    #[arg(global = true, long = "db")]
    pub db: Option<String>,

    /// Run in test mode (no config file update)
    #[arg(global = true, long = "test", hide = true)]
    pub test: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize the database and configuration
    Init,

    /// Manage the configuration file (view or edit)
    Config {
        #[arg(long = "print", help = "Print the current configuration file")]
        print_config: bool,

        #[arg(long = "check", help = "Check configuration file for missing fields")]
        check: bool,

        #[arg(long = "migrate", help = "Add missing fields to the configuration file")]
        migrate: bool,

        #[arg(
            long = "edit",
            help = "Edit the configuration file (default editor: $EDITOR, or nano/notepad)"
        )]
        edit_config: bool,

        #[arg(
            long = "editor",
            help = "Specify the editor to use (vim, nano, or custom path)"
        )]
        editor: Option<String>,
    },

    /// Manage the database (migrations, integrity checks, etc.)
    Db {
        #[arg(long = "migrate", help = "Run pending database migrations")]
        migrate: bool,

        #[arg(long = "check", help = "Check database integrity")]
        check: bool,

        #[arg(long = "vacuum", help = "Optimize the database using VACUUM")]
        vacuum: bool,

        #[arg(long = "info", help = "Show database information")]
        info: bool,
    },

    /// Manage construction sites
    Site {
        #[command(subcommand)]
        action: SiteAction,
    },

    /// Manage workers and their wage policy
    Worker {
        #[command(subcommand)]
        action: WorkerAction,
    },

    /// Record a day of attendance and accrue the wage
    Attend {
        /// Worker id
        worker: String,

        /// Date of attendance (YYYY-MM-DD, default today)
        #[arg(long)]
        date: Option<String>,

        /// present | absent | half-day
        #[arg(long, default_value = "present")]
        status: String,

        /// Check-in time (HH:MM), required for hourly workers
        #[arg(long = "in")]
        time_in: Option<String>,

        /// Check-out time (HH:MM)
        #[arg(long = "out")]
        time_out: Option<String>,

        /// Supply the check-out of an incomplete attendance record
        #[arg(long = "complete", value_name = "ATTENDANCE_ID", requires = "time_out")]
        complete: Option<String>,
    },

    /// Pay a worker out of their pending balance
    Pay {
        /// Worker id
        worker: String,

        /// Amount, e.g. 500 or 250.50
        amount: String,

        /// Payment date (YYYY-MM-DD, default today)
        #[arg(long)]
        date: Option<String>,

        /// Payment method (default from config)
        #[arg(long)]
        method: Option<String>,

        /// wage | advance
        #[arg(long, default_value = "wage")]
        kind: String,

        #[arg(long)]
        notes: Option<String>,
    },

    /// Monthly payroll for a site
    Payroll {
        #[arg(long)]
        site: String,

        /// Month (YYYY-MM, default current month)
        #[arg(long)]
        month: Option<String>,
    },

    /// Compare stored balances with attendance and payment history
    Reconcile {
        #[arg(long)]
        worker: Option<String>,
    },

    /// Totals across all sites
    Summary,

    /// Print the audit trail, newest first
    Audit {
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Backup the database to a file
    Backup {
        #[arg(long = "file", help = "Destination backup file path")]
        file: String,

        #[arg(long = "compress", help = "Compress the backup (zip)")]
        compress: bool,

        #[arg(long = "force", help = "Overwrite the destination if it exists")]
        force: bool,
    },
}

#[derive(Subcommand)]
pub enum SiteAction {
    /// Add a new site
    Add {
        name: String,
        #[arg(long, default_value = "")]
        address: String,
    },
    /// List sites
    List {
        /// Include inactive sites
        #[arg(long)]
        all: bool,
    },
    /// Show a site with its workers and totals
    Show { id: String },
    /// Edit site details
    Edit {
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        address: Option<String>,
        #[arg(long)]
        active: Option<bool>,
    },
    /// Delete a site with its workers, attendance and payments
    Del { id: String },
}

#[derive(Subcommand)]
pub enum WorkerAction {
    /// Add a worker to a site
    Add {
        #[arg(long)]
        site: String,
        name: String,
        #[arg(long, default_value = "")]
        phone: String,
        /// daily | hourly | monthly
        #[arg(long = "wage-type")]
        wage_type: String,
        /// Rate per day / hour / month
        #[arg(long)]
        wage: String,
    },
    /// List workers
    List {
        #[arg(long)]
        site: Option<String>,
    },
    /// Show a worker's statement: attendance, payments and balance
    Show { id: String },
    /// Edit worker profile or wage policy
    Edit {
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        phone: Option<String>,
        #[arg(long = "wage-type")]
        wage_type: Option<String>,
        #[arg(long)]
        wage: Option<String>,
        #[arg(long)]
        active: Option<bool>,
    },
    /// Delete a worker with their attendance and payments
    Del { id: String },
}
