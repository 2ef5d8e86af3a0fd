//! Spreadsheet-backed order store.
//!
//! The whole table lives in one `.xlsx` file. Every operation loads the full
//! sheet, changes it in memory and rewrites the file; there is no incremental
//! access and no locking (single interactive user).
//!
//! Rows are addressed either by position (`update_at` / `delete_at`, where a
//! deletion shifts every later index down by one) or by the stable `ID`
//! column (`update` / `delete`).

use calamine::{open_workbook, Data, Reader, Xlsx};
use chrono::NaiveDateTime;
use rust_xlsxwriter::{Workbook, Worksheet};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::models::{Order, OrderId, OrderPatch, OrderStatus, PaymentMethod, DATE_FORMAT};

pub const COL_DATE: &str = "Data";
pub const COL_NAME: &str = "Nome";
pub const COL_PHONE: &str = "Telefone";
pub const COL_PRODUCT: &str = "Produto";
pub const COL_QUANTITY: &str = "Quantidade";
pub const COL_PAYMENT: &str = "Pagamento";
pub const COL_STATUS: &str = "Status";
pub const COL_TOTAL: &str = "Valor Total";
pub const COL_ID: &str = "ID";

/// Header row in write order. `ID` is last so older readers keep finding
/// the original columns where they expect them.
pub const COLUMNS: [&str; 9] = [
    COL_DATE,
    COL_NAME,
    COL_PHONE,
    COL_PRODUCT,
    COL_QUANTITY,
    COL_PAYMENT,
    COL_STATUS,
    COL_TOTAL,
    COL_ID,
];

/// Columns a sheet must carry to be read as an order table. Phone, total and
/// id were added by later revisions and may be absent.
const REQUIRED_COLUMNS: [&str; 6] = [
    COL_DATE,
    COL_NAME,
    COL_PRODUCT,
    COL_QUANTITY,
    COL_PAYMENT,
    COL_STATUS,
];

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Falha ao acessar {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Falha ao ler {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: calamine::XlsxError,
    },
    #[error("Falha ao gravar {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: rust_xlsxwriter::XlsxError,
    },
    #[error("Planilha {} sem a coluna '{column}'", path.display())]
    MissingColumn { path: PathBuf, column: &'static str },
    #[error("Linha {row} inválida: {reason}")]
    MalformedRow { row: usize, reason: String },
    #[error("Pedido {0} não encontrado")]
    NotFound(OrderId),
    #[error("Linha {index} não existe (total de {len} pedidos)")]
    RowOutOfRange { index: usize, len: usize },
}

pub struct OrderStore {
    path: PathBuf,
}

impl OrderStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load every order in file order. Creates an empty table when the file
    /// does not exist, and persists ids for rows that had none.
    pub fn load(&self) -> Result<Vec<Order>, StoreError> {
        if !self.path.exists() {
            info!(path = %self.path.display(), "order store not found, creating empty table");
            self.save(&[])?;
            return Ok(Vec::new());
        }

        let (orders, assigned_ids) = read_orders(&self.path)?;
        if assigned_ids > 0 {
            info!(
                path = %self.path.display(),
                assigned_ids,
                "persisting ids for rows without one"
            );
            self.save(&orders)?;
        }
        Ok(orders)
    }

    pub fn append(&self, order: Order) -> Result<(), StoreError> {
        let mut orders = self.load()?;
        debug!(order_id = %order.id, rows = orders.len() + 1, "appending order");
        orders.push(order);
        self.save(&orders)
    }

    /// Update the row at `index`; returns the row as it was before.
    pub fn update_at(&self, index: usize, patch: &OrderPatch) -> Result<Order, StoreError> {
        let mut orders = self.load()?;
        let len = orders.len();
        let row = orders
            .get_mut(index)
            .ok_or(StoreError::RowOutOfRange { index, len })?;
        let previous = row.clone();
        if patch.is_empty() {
            return Ok(previous);
        }
        patch.apply(row);
        self.save(&orders)?;
        Ok(previous)
    }

    /// Remove the row at `index`; later rows move up by one.
    pub fn delete_at(&self, index: usize) -> Result<Order, StoreError> {
        let mut orders = self.load()?;
        if index >= orders.len() {
            return Err(StoreError::RowOutOfRange {
                index,
                len: orders.len(),
            });
        }
        let removed = orders.remove(index);
        self.save(&orders)?;
        Ok(removed)
    }

    /// Update the order with `id`; returns the order as it was before.
    pub fn update(&self, id: OrderId, patch: &OrderPatch) -> Result<Order, StoreError> {
        let mut orders = self.load()?;
        let row = orders
            .iter_mut()
            .find(|o| o.id == id)
            .ok_or(StoreError::NotFound(id))?;
        let previous = row.clone();
        if patch.is_empty() {
            return Ok(previous);
        }
        patch.apply(row);
        self.save(&orders)?;
        Ok(previous)
    }

    pub fn delete(&self, id: OrderId) -> Result<Order, StoreError> {
        let mut orders = self.load()?;
        let index = orders
            .iter()
            .position(|o| o.id == id)
            .ok_or(StoreError::NotFound(id))?;
        let removed = orders.remove(index);
        self.save(&orders)?;
        Ok(removed)
    }

    pub fn find(&self, id: OrderId) -> Result<Order, StoreError> {
        self.load()?
            .into_iter()
            .find(|o| o.id == id)
            .ok_or(StoreError::NotFound(id))
    }

    /// Rewrite the whole file through a sibling temp file so a failed write
    /// never truncates the store.
    fn save(&self, orders: &[Order]) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| StoreError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        let tmp = temp_path(&self.path);
        if let Err(e) = write_orders(&tmp, orders) {
            let _ = fs::remove_file(&tmp);
            return Err(e);
        }
        fs::rename(&tmp, &self.path).map_err(|source| {
            let _ = fs::remove_file(&tmp);
            StoreError::Io {
                path: self.path.clone(),
                source,
            }
        })
    }
}

fn temp_path(path: &Path) -> PathBuf {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "pedidos.xlsx".to_string());
    path.with_file_name(format!(".{file_name}.tmp"))
}

// ---------------------------------------------------------------------------
// Writing
// ---------------------------------------------------------------------------

/// Write `orders` to a new workbook at `path` with the full header row.
/// Also used for the daily report export.
pub fn write_orders(path: &Path, orders: &[Order]) -> Result<(), StoreError> {
    let to_err = |source| StoreError::Write {
        path: path.to_path_buf(),
        source,
    };

    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    write_header(sheet).map_err(to_err)?;
    for (i, order) in orders.iter().enumerate() {
        // Row 0 is the header; sheets cap out far below u32::MAX rows.
        let row = (i + 1) as u32;
        write_order_row(sheet, row, order).map_err(to_err)?;
    }
    workbook.save(path).map_err(to_err)
}

fn write_header(sheet: &mut Worksheet) -> Result<(), rust_xlsxwriter::XlsxError> {
    for (col, name) in COLUMNS.iter().enumerate() {
        sheet.write_string(0, col as u16, *name)?;
    }
    Ok(())
}

fn write_order_row(
    sheet: &mut Worksheet,
    row: u32,
    order: &Order,
) -> Result<(), rust_xlsxwriter::XlsxError> {
    sheet.write_string(row, 0, order.date.as_str())?;
    sheet.write_string(row, 1, order.name.as_str())?;
    sheet.write_string(row, 2, order.phone.as_str())?;
    sheet.write_string(row, 3, order.product.as_str())?;
    sheet.write_number(row, 4, f64::from(order.quantity))?;
    sheet.write_string(row, 5, order.payment.label())?;
    sheet.write_string(row, 6, order.status.label())?;
    if let Some(total) = order.line_total {
        sheet.write_number(row, 7, total)?;
    }
    sheet.write_string(row, 8, order.id.to_string())?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Reading
// ---------------------------------------------------------------------------

/// Positions of the known columns inside the sheet being read.
struct ColumnMap {
    date: usize,
    name: usize,
    phone: Option<usize>,
    product: usize,
    quantity: usize,
    payment: usize,
    status: usize,
    total: Option<usize>,
    id: Option<usize>,
}

impl ColumnMap {
    fn from_header(path: &Path, header: &[Data]) -> Result<Self, StoreError> {
        let names: Vec<String> = header.iter().map(|c| cell_text(c).trim().to_string()).collect();
        let find = |column: &str| names.iter().position(|n| n == column);

        for column in REQUIRED_COLUMNS {
            if find(column).is_none() {
                return Err(StoreError::MissingColumn {
                    path: path.to_path_buf(),
                    column,
                });
            }
        }
        // Presence checked above.
        let at = |column: &str| find(column).unwrap_or_default();
        Ok(Self {
            date: at(COL_DATE),
            name: at(COL_NAME),
            phone: find(COL_PHONE),
            product: at(COL_PRODUCT),
            quantity: at(COL_QUANTITY),
            payment: at(COL_PAYMENT),
            status: at(COL_STATUS),
            total: find(COL_TOTAL),
            id: find(COL_ID),
        })
    }
}

/// Returns the orders plus how many of them got a freshly generated id.
fn read_orders(path: &Path) -> Result<(Vec<Order>, usize), StoreError> {
    let to_err = |source| StoreError::Read {
        path: path.to_path_buf(),
        source,
    };
    let mut workbook: Xlsx<_> = open_workbook(path).map_err(to_err)?;
    let range = match workbook.worksheet_range_at(0) {
        Some(range) => range.map_err(to_err)?,
        None => {
            warn!(path = %path.display(), "workbook has no worksheet, treating as empty");
            return Ok((Vec::new(), 0));
        }
    };

    let mut rows = range.rows();
    let Some(header) = rows.next() else {
        return Ok((Vec::new(), 0));
    };
    let columns = ColumnMap::from_header(path, header)?;

    let mut orders = Vec::new();
    let mut assigned_ids = 0;
    for (i, cells) in rows.enumerate() {
        if cells.iter().all(|c| matches!(c, Data::Empty)) {
            continue;
        }
        // 1-based sheet row number, header included.
        let row_number = i + 2;
        let (order, generated) = parse_row(&columns, cells, row_number)?;
        if generated {
            assigned_ids += 1;
        }
        orders.push(order);
    }
    debug!(path = %path.display(), rows = orders.len(), "order store loaded");
    Ok((orders, assigned_ids))
}

static EMPTY_CELL: Data = Data::Empty;

fn parse_row(
    columns: &ColumnMap,
    cells: &[Data],
    row: usize,
) -> Result<(Order, bool), StoreError> {
    let cell = |idx: usize| cells.get(idx).unwrap_or(&EMPTY_CELL);
    let text = |idx: usize| cell_text(cell(idx)).trim().to_string();
    let malformed = |reason: String| StoreError::MalformedRow { row, reason };

    let quantity = parse_quantity_cell(cell(columns.quantity))
        .ok_or_else(|| malformed(format!("quantidade inválida '{}'", text(columns.quantity))))?;
    let payment = text(columns.payment)
        .parse::<PaymentMethod>()
        .map_err(|e| malformed(format!("{e}")))?;
    let status = text(columns.status)
        .parse::<OrderStatus>()
        .map_err(|e| malformed(format!("{e}")))?;
    let line_total = match columns.total.map(cell) {
        None | Some(Data::Empty) => None,
        Some(c) => Some(
            cell_number(c).ok_or_else(|| malformed(format!("valor total inválido '{c}'")))?,
        ),
    };

    let stored_id = columns.id.map(text).filter(|s| !s.is_empty());
    let (id, generated) = match stored_id {
        Some(raw) => (
            raw.parse::<OrderId>()
                .map_err(|_| malformed(format!("ID inválido '{raw}'")))?,
            false,
        ),
        None => (OrderId::new(), true),
    };

    Ok((
        Order {
            id,
            date: text(columns.date),
            name: text(columns.name),
            phone: columns.phone.map(text).unwrap_or_default(),
            product: text(columns.product),
            quantity,
            payment,
            status,
            line_total,
        },
        generated,
    ))
}

/// Cell rendered as the text the original program stored. Phone numbers
/// typed into Excel come back as floats, so integral floats lose the `.0`.
fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) | Data::DateTimeIso(s) | Data::DurationIso(s) => s.clone(),
        Data::Float(f) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", *f as i64),
        Data::Float(f) => f.to_string(),
        Data::Int(i) => i.to_string(),
        Data::Bool(b) => b.to_string(),
        Data::DateTime(dt) => dt
            .as_datetime()
            .map(|d: NaiveDateTime| d.format(DATE_FORMAT).to_string())
            .unwrap_or_else(|| dt.as_f64().to_string()),
        Data::Error(e) => e.to_string(),
    }
}

fn cell_number(cell: &Data) -> Option<f64> {
    match cell {
        Data::Float(f) => Some(*f),
        Data::Int(i) => Some(*i as f64),
        Data::String(s) => s.trim().replace(',', ".").parse().ok(),
        _ => None,
    }
}

fn parse_quantity_cell(cell: &Data) -> Option<u32> {
    let value = cell_number(cell)?;
    if value.fract() != 0.0 || value < 1.0 || value > f64::from(u32::MAX) {
        return None;
    }
    Some(value as u32)
}
