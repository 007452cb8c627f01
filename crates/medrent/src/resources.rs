// SPDX-FileCopyrightText: 2026 Medrent Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Resource subcommands: `medrent instruments|clients|staff|orders|reports`.
//!
//! Each domain gets the same CRUD verbs on its main collection, the same
//! verbs nested under each secondary collection, and its named actions.

use std::io::Write;
use std::path::PathBuf;

use clap::{Args, Subcommand};
use medrent_api::{ListQuery, ResourceClient};
use medrent_core::MedrentError;
use serde_json::Value;

use crate::app::App;
use crate::output::Output;

#[derive(Debug, Subcommand)]
pub enum CrudCommand {
    /// List records.
    List(ListArgs),
    /// Show one record.
    Get { id: u64 },
    /// Create a record from a JSON object.
    Create {
        #[arg(long)]
        data: String,
    },
    /// Replace a record, or change some fields with `--partial`.
    Update {
        id: u64,
        #[arg(long)]
        data: String,
        #[arg(long)]
        partial: bool,
    },
    /// Delete a record.
    Delete { id: u64 },
}

#[derive(Debug, Args)]
pub struct ListArgs {
    #[arg(long)]
    pub search: Option<String>,
    /// Sort field, `-` prefix for descending.
    #[arg(long)]
    pub ordering: Option<String>,
    #[arg(long)]
    pub page: Option<u32>,
    /// Filters as `key=value`, e.g. `status=available`.
    pub filters: Vec<String>,
}

impl ListArgs {
    fn query(&self) -> Result<ListQuery, MedrentError> {
        let mut query = ListQuery::from_pairs(self.filters.iter().map(String::as_str))?;
        if let Some(term) = &self.search {
            query = query.search(term);
        }
        if let Some(field) = &self.ordering {
            query = query.ordering(field);
        }
        if let Some(page) = self.page {
            query = query.page(page);
        }
        Ok(query)
    }
}

#[derive(Debug, Subcommand)]
pub enum InstrumentCommand {
    #[command(flatten)]
    Records(CrudCommand),
    Categories {
        #[command(subcommand)]
        command: CrudCommand,
    },
    Maintenance {
        #[command(subcommand)]
        command: CrudCommand,
    },
    /// Maintenance records of one instrument.
    History { id: u64 },
}

#[derive(Debug, Subcommand)]
pub enum ClientCommand {
    #[command(flatten)]
    Records(CrudCommand),
    Contacts {
        #[command(subcommand)]
        command: CrudCommand,
    },
    Addresses {
        #[command(subcommand)]
        command: CrudCommand,
    },
    /// Contacts and addresses of one client.
    Details { id: u64 },
}

#[derive(Debug, Subcommand)]
pub enum StaffCommand {
    #[command(flatten)]
    Records(CrudCommand),
    Departments {
        #[command(subcommand)]
        command: CrudCommand,
    },
    Attendance {
        #[command(subcommand)]
        command: CrudCommand,
    },
    Leaves {
        #[command(subcommand)]
        command: CrudCommand,
    },
    /// Record the current user's arrival.
    CheckIn,
    /// Record the current user's departure.
    CheckOut,
    /// Approve a leave request.
    Approve { leave_id: u64 },
    /// Reject a leave request.
    Reject {
        leave_id: u64,
        #[arg(long)]
        reason: String,
    },
}

#[derive(Debug, Subcommand)]
pub enum OrderCommand {
    #[command(flatten)]
    Records(CrudCommand),
    Items {
        #[command(subcommand)]
        command: CrudCommand,
    },
    Payments {
        #[command(subcommand)]
        command: CrudCommand,
    },
    Invoices {
        #[command(subcommand)]
        command: CrudCommand,
    },
    Cancel { id: u64 },
    /// Generate the invoice for an order.
    Invoice { id: u64 },
    SendInvoice { invoice_id: u64 },
    MarkPaid { invoice_id: u64 },
}

#[derive(Debug, Subcommand)]
pub enum ReportCommand {
    #[command(flatten)]
    Records(CrudCommand),
    Dashboards {
        #[command(subcommand)]
        command: CrudCommand,
    },
    Widgets {
        #[command(subcommand)]
        command: CrudCommand,
    },
    /// Generate a report from a JSON parameter object.
    Generate {
        #[arg(long)]
        data: String,
    },
    /// Download a generated report file.
    Download {
        id: u64,
        /// Write to this file instead of stdout.
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
    /// Show the default dashboard.
    Dashboard,
    /// Data behind one dashboard widget.
    WidgetData {
        id: u64,
        filters: Vec<String>,
    },
}

pub async fn instruments(
    app: &App,
    command: InstrumentCommand,
    out: &Output,
) -> Result<(), MedrentError> {
    let service = app.api.instruments();
    match command {
        InstrumentCommand::Records(cmd) => crud(&service.instruments(), cmd, out).await,
        InstrumentCommand::Categories { command } => crud(&service.categories(), command, out).await,
        InstrumentCommand::Maintenance { command } => {
            crud(&service.maintenance(), command, out).await
        }
        InstrumentCommand::History { id } => {
            out.records(&service.maintenance_for(id).await?);
            Ok(())
        }
    }
}

pub async fn clients(app: &App, command: ClientCommand, out: &Output) -> Result<(), MedrentError> {
    let service = app.api.clients();
    match command {
        ClientCommand::Records(cmd) => crud(&service.clients(), cmd, out).await,
        ClientCommand::Contacts { command } => crud(&service.contacts(), command, out).await,
        ClientCommand::Addresses { command } => crud(&service.addresses(), command, out).await,
        ClientCommand::Details { id } => {
            let (contacts, addresses) =
                tokio::try_join!(service.contacts_for(id), service.addresses_for(id))?;
            out.record(&serde_json::json!({
                "client": id,
                "contacts": contacts,
                "addresses": addresses,
            }));
            Ok(())
        }
    }
}

pub async fn staff(app: &App, command: StaffCommand, out: &Output) -> Result<(), MedrentError> {
    let service = app.api.staff();
    let result = match command {
        StaffCommand::Records(cmd) => return crud(&service.members(), cmd, out).await,
        StaffCommand::Departments { command } => {
            return crud(&service.departments(), command, out).await;
        }
        StaffCommand::Attendance { command } => {
            return crud(&service.attendance(), command, out).await;
        }
        StaffCommand::Leaves { command } => return crud(&service.leaves(), command, out).await,
        StaffCommand::CheckIn => service.check_in().await?,
        StaffCommand::CheckOut => service.check_out().await?,
        StaffCommand::Approve { leave_id } => service.approve_leave(leave_id).await?,
        StaffCommand::Reject { leave_id, reason } => service.reject_leave(leave_id, &reason).await?,
    };
    out.record(&result);
    Ok(())
}

pub async fn orders(app: &App, command: OrderCommand, out: &Output) -> Result<(), MedrentError> {
    let service = app.api.orders();
    let result = match command {
        OrderCommand::Records(cmd) => return crud(&service.orders(), cmd, out).await,
        OrderCommand::Items { command } => return crud(&service.items(), command, out).await,
        OrderCommand::Payments { command } => return crud(&service.payments(), command, out).await,
        OrderCommand::Invoices { command } => return crud(&service.invoices(), command, out).await,
        OrderCommand::Cancel { id } => service.cancel(id).await?,
        OrderCommand::Invoice { id } => service.generate_invoice(id).await?,
        OrderCommand::SendInvoice { invoice_id } => service.send_invoice(invoice_id).await?,
        OrderCommand::MarkPaid { invoice_id } => service.mark_invoice_paid(invoice_id).await?,
    };
    out.record(&result);
    Ok(())
}

pub async fn reports(app: &App, command: ReportCommand, out: &Output) -> Result<(), MedrentError> {
    let service = app.api.reports();
    let result = match command {
        ReportCommand::Records(cmd) => return crud(&service.reports(), cmd, out).await,
        ReportCommand::Dashboards { command } => {
            return crud(&service.dashboards(), command, out).await;
        }
        ReportCommand::Widgets { command } => return crud(&service.widgets(), command, out).await,
        ReportCommand::Generate { data } => service.generate(parse_data(&data)?).await?,
        ReportCommand::Download { id, output } => {
            let bytes = service.download(id).await?;
            return write_download(&bytes, output, out).await;
        }
        ReportCommand::Dashboard => service.default_dashboard().await?,
        ReportCommand::WidgetData { id, filters } => {
            let query = ListQuery::from_pairs(filters.iter().map(String::as_str))?;
            service.widget_data(id, &query).await?
        }
    };
    out.record(&result);
    Ok(())
}

async fn crud(
    resource: &ResourceClient,
    command: CrudCommand,
    out: &Output,
) -> Result<(), MedrentError> {
    match command {
        CrudCommand::List(args) => {
            let records: Vec<Value> = resource.list(&args.query()?).await?;
            out.records(&records);
        }
        CrudCommand::Get { id } => {
            let record: Value = resource.retrieve(id).await?;
            out.record(&record);
        }
        CrudCommand::Create { data } => {
            let record: Value = resource.create(&parse_data(&data)?).await?;
            out.record(&record);
        }
        CrudCommand::Update { id, data, partial } => {
            let body = parse_data(&data)?;
            let record: Value = if partial {
                resource.partial_update(id, &body).await?
            } else {
                resource.update(id, &body).await?
            };
            out.record(&record);
        }
        CrudCommand::Delete { id } => {
            resource.delete(id).await?;
            out.done(&format!("deleted {}{id}/", resource.collection()));
        }
    }
    Ok(())
}

/// `--data` must be a JSON object.
fn parse_data(data: &str) -> Result<Value, MedrentError> {
    match serde_json::from_str::<Value>(data) {
        Ok(value @ Value::Object(_)) => Ok(value),
        Ok(_) => Err(MedrentError::field("data", "Expected a JSON object.")),
        Err(e) => Err(MedrentError::field("data", format!("Invalid JSON: {e}"))),
    }
}

async fn write_download(
    bytes: &[u8],
    path: Option<PathBuf>,
    out: &Output,
) -> Result<(), MedrentError> {
    let storage = |e: std::io::Error| MedrentError::Storage {
        source: Box::new(e),
    };
    match path {
        Some(path) => {
            tokio::fs::write(&path, bytes).await.map_err(storage)?;
            out.done(&format!("wrote {} bytes to {}", bytes.len(), path.display()));
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(bytes).map_err(storage)?;
            stdout.flush().map_err(storage)?;
        }
    }
    Ok(())
}
