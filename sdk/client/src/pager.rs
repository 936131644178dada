use {
  crate::{
    config::ClientConfig,
    executor::RpcExecutor,
    transport::{Row, TableRowsRequest, TableScope, TableScopesRequest},
    Error,
  },
  ledger_primitives::Name,
  serde::de::DeserializeOwned,
  serde_json::Value,
  tracing::debug,
};

pub const DEFAULT_PAGE_SIZE: u32 = 1000;
pub const DEFAULT_SCOPE_PAGE_SIZE: u32 = 10_000;

/// A row found by a scan over every scope of a table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScopedRow {
  pub scope: String,
  pub row: Row,
}

/// Materializes whole tables out of paginated reads.
///
/// Nodes treat the lower bound as inclusive, so every page after the
/// first starts at the last row already seen. That row is requested on
/// top of the page size and dropped, which keeps progress even with a
/// page size of one.
pub struct TablePager<'a> {
  executor: &'a RpcExecutor,
  page_size: u32,
  scope_page_size: u32,
}

impl<'a> TablePager<'a> {
  pub fn new(executor: &'a RpcExecutor, page_size: u32) -> Self {
    Self {
      executor,
      page_size: page_size.max(1),
      scope_page_size: DEFAULT_SCOPE_PAGE_SIZE,
    }
  }

  /// Page sizes taken from `config`.
  pub fn from_config(
    executor: &'a RpcExecutor,
    config: &ClientConfig,
  ) -> Self {
    Self::new(executor, config.page_size)
      .with_scope_page_size(config.scope_page_size)
  }

  pub fn with_scope_page_size(mut self, scope_page_size: u32) -> Self {
    self.scope_page_size = scope_page_size.max(1);
    self
  }

  pub fn fetch_all_rows(
    &self,
    base: &TableRowsRequest,
    key_field: &str,
  ) -> Result<Vec<Row>, Error> {
    self.fetch_all_rows_from(base, key_field, "")
  }

  pub fn fetch_all_rows_from(
    &self,
    base: &TableRowsRequest,
    key_field: &str,
    start: &str,
  ) -> Result<Vec<Row>, Error> {
    self.fetch_all_rows_advancing(base, key_field, start, str::to_owned)
  }

  /// Reads every row from `start` onwards, in the order the node returns
  /// them.
  ///
  /// `key_advance` maps a cursor, the stringified `key_field` of the last
  /// row seen, to the lower bound of the next read. It lets callers page
  /// through secondary indices whose bound is not the raw key value.
  pub fn fetch_all_rows_advancing(
    &self,
    base: &TableRowsRequest,
    key_field: &str,
    start: &str,
    key_advance: impl Fn(&str) -> String,
  ) -> Result<Vec<Row>, Error> {
    let mut request = base.clone();
    let mut rows = Vec::new();
    let mut cursor: Option<String> = None;
    let mut pages = 0usize;

    loop {
      let (lower_bound, limit) = match &cursor {
        None => (key_advance(start), self.page_size),
        Some(cursor) => (key_advance(cursor), self.page_size.saturating_add(1)),
      };
      request.lower_bound = lower_bound;
      request.limit = limit;

      let page = self.executor.fetch_rows(&request)?;
      pages += 1;

      let more = page.more;
      let mut fresh = page.rows;
      let overlaps = match (&cursor, fresh.first()) {
        (Some(cursor), Some(first)) => key_of(first, key_field)? == *cursor,
        _ => false,
      };
      if overlaps {
        fresh.remove(0);
      }

      let last_key = match fresh.last() {
        Some(last) => key_of(last, key_field)?,
        None => break,
      };

      debug!(
        "{}/{}: page {pages} added {} rows, cursor {last_key}",
        request.code,
        request.table,
        fresh.len()
      );
      rows.extend(fresh);

      if !more {
        break;
      }
      cursor = Some(last_key);
    }

    Ok(rows)
  }

  /// Same as [`TablePager::fetch_all_rows`], with every row decoded into
  /// `T`.
  pub fn fetch_all_rows_as<T: DeserializeOwned>(
    &self,
    base: &TableRowsRequest,
    key_field: &str,
  ) -> Result<Vec<T>, Error> {
    self
      .fetch_all_rows(base, key_field)?
      .into_iter()
      .map(|row| serde_json::from_value(Value::Object(row)).map_err(Error::from))
      .collect()
  }

  pub fn fetch_all_scopes(
    &self,
    code: Name,
    table: Name,
  ) -> Result<Vec<TableScope>, Error> {
    let mut request = TableScopesRequest {
      code,
      table,
      limit: self.scope_page_size,
      ..Default::default()
    };

    let mut scopes = Vec::new();
    loop {
      let page = self.executor.fetch_scopes(&request)?;
      scopes.extend(page.scopes);
      if page.more.is_empty() {
        return Ok(scopes);
      }
      request.lower_bound = page.more;
    }
  }

  /// Reads every row in every scope of `base.table`. The scope of `base`
  /// is ignored. Rows are grouped by scope, in scope listing order.
  pub fn fetch_all_rows_across_scopes(
    &self,
    base: &TableRowsRequest,
    key_field: &str,
  ) -> Result<Vec<ScopedRow>, Error> {
    let mut all = Vec::new();
    for scope in self.fetch_all_scopes(base.code, base.table)? {
      let request = TableRowsRequest {
        scope: scope.scope.clone(),
        ..base.clone()
      };
      all.extend(
        self
          .fetch_all_rows(&request, key_field)?
          .into_iter()
          .map(|row| ScopedRow {
            scope: scope.scope.clone(),
            row,
          }),
      );
    }
    Ok(all)
  }

  pub fn is_table_scope_empty(
    &self,
    code: Name,
    scope: &str,
    table: Name,
  ) -> Result<bool, Error> {
    let request = TableRowsRequest {
      limit: 1,
      ..TableRowsRequest::new(code, scope, table)
    };
    Ok(self.executor.fetch_rows(&request)?.rows.is_empty())
  }

  pub fn is_table_empty(&self, code: Name, table: Name) -> Result<bool, Error> {
    for scope in self.fetch_all_scopes(code, table)? {
      if !self.is_table_scope_empty(code, &scope.scope, table)? {
        return Ok(false);
      }
    }
    Ok(true)
  }

  pub fn are_tables_empty(
    &self,
    code: Name,
    tables: &[Name],
  ) -> Result<bool, Error> {
    for table in tables {
      if !self.is_table_empty(code, *table)? {
        return Ok(false);
      }
    }
    Ok(true)
  }
}

/// Cursor form of a row key: strings unquoted, numbers in decimal.
fn key_of(row: &Row, key_field: &str) -> Result<String, Error> {
  match row.get(key_field) {
    Some(Value::String(key)) => Ok(key.clone()),
    Some(Value::Null) | None => Err(Error::MissingKeyField {
      field: key_field.to_owned(),
    }),
    Some(other) => Ok(other.to_string()),
  }
}
