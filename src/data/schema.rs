use std::fmt;

// ---------------------------------------------------------------------------
// Column identities and their declared semantic types
// ---------------------------------------------------------------------------

/// How a column's cells are coerced on load and treated during cleaning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SemanticType {
    /// Whole numbers (ids, ages, incomes, quantities).
    Integer,
    /// Real numbers (prices, spend).
    Numeric,
    /// Free text drawn from a small open set of labels.
    Categorical,
    /// Calendar date without time of day.
    Date,
}

impl SemanticType {
    /// Integer and numeric columns are imputed with the median and take part
    /// in the correlation matrix.
    pub fn is_numeric(self) -> bool {
        matches!(self, SemanticType::Integer | SemanticType::Numeric)
    }
}

/// Every column the pipeline knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Column {
    CustomerId,
    Age,
    Gender,
    Income,
    Category,
    Quantity,
    Price,
    Discount,
    PurchaseDate,
    TotalSpend,
}

impl Column {
    /// The nine columns a source table must carry, in canonical order.
    pub const REQUIRED: [Column; 9] = [
        Column::CustomerId,
        Column::Age,
        Column::Gender,
        Column::Income,
        Column::Category,
        Column::Quantity,
        Column::Price,
        Column::Discount,
        Column::PurchaseDate,
    ];

    /// All columns of an enriched table, in display order.
    pub const ALL: [Column; 10] = [
        Column::CustomerId,
        Column::Age,
        Column::Gender,
        Column::Income,
        Column::Category,
        Column::Quantity,
        Column::Price,
        Column::Discount,
        Column::PurchaseDate,
        Column::TotalSpend,
    ];

    /// Numeric columns of an enriched table (correlation matrix axes).
    pub const NUMERIC: [Column; 6] = [
        Column::CustomerId,
        Column::Age,
        Column::Income,
        Column::Quantity,
        Column::Price,
        Column::TotalSpend,
    ];

    /// Header name used in tabular files.
    pub fn name(self) -> &'static str {
        match self {
            Column::CustomerId => "Customer_ID",
            Column::Age => "Age",
            Column::Gender => "Gender",
            Column::Income => "Income",
            Column::Category => "Product_Category",
            Column::Quantity => "Quantity",
            Column::Price => "Price",
            Column::Discount => "Discount_Applied",
            Column::PurchaseDate => "Purchase_Date",
            Column::TotalSpend => "Total_Spend",
        }
    }

    pub fn semantic_type(self) -> SemanticType {
        match self {
            Column::CustomerId | Column::Age | Column::Income | Column::Quantity => {
                SemanticType::Integer
            }
            Column::Price | Column::TotalSpend => SemanticType::Numeric,
            Column::Gender | Column::Category | Column::Discount => SemanticType::Categorical,
            Column::PurchaseDate => SemanticType::Date,
        }
    }

    /// Look a column up by its exact header name.
    pub fn from_name(name: &str) -> Option<Column> {
        Column::ALL.into_iter().find(|c| c.name() == name)
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
