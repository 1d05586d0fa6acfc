use crate::error::DatasetError;
use crate::models::WorkItem;

/// 一行数据：列名 -> 值，按文件中的列顺序
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetRecord {
    fields: Vec<(String, String)>,
}

impl DatasetRecord {
    pub fn new(fields: Vec<(String, String)>) -> Self {
        Self { fields }
    }

    pub fn get(&self, column: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value.as_str())
    }
}

/// 解析后的数据集；所有记录共用 `columns`
#[derive(Debug, Clone)]
pub struct Dataset {
    columns: Vec<String>,
    records: Vec<DatasetRecord>,
}

impl Dataset {
    pub fn new(columns: Vec<String>, records: Vec<DatasetRecord>) -> Self {
        Self { columns, records }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn records(&self) -> &[DatasetRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// 批号列：优先精确匹配 "Lot"，其次忽略大小写等于 "lot"，
    /// 最后取第一个名称包含 "lot" 的列
    pub fn identifier_column(&self) -> Result<&str, DatasetError> {
        let exact = self.columns.iter().find(|c| c.as_str() == "Lot");
        let equal = || self.columns.iter().find(|c| c.eq_ignore_ascii_case("lot"));
        let contains = || {
            self.columns
                .iter()
                .find(|c| c.to_lowercase().contains("lot"))
        };

        exact
            .or_else(equal)
            .or_else(contains)
            .map(String::as_str)
            .ok_or_else(|| DatasetError::MissingIdentifierColumn {
                columns: self.columns.clone(),
            })
    }

    /// 按行顺序返回每条记录去除首尾空白后的批号
    pub fn work_items(&self) -> Result<Vec<WorkItem>, DatasetError> {
        let column = self.identifier_column()?;
        Ok(self
            .records
            .iter()
            .map(|record| WorkItem::new(record.get(column).unwrap_or_default().trim()))
            .collect())
    }
}
