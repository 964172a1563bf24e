//! Shared builders for grid integration tests.
#![allow(
    dead_code,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::panic
)]

use cellgrid::{
    derive_state, Cell, CellLocation, ColumnDef, GridProps, Location, PropsHandle, RowDef, State,
};

/// `rows` x `columns` grid of text cells reading `"r{row}c{column}"`.
pub fn text_grid(rows: usize, columns: usize) -> GridProps {
    GridProps::new(
        (0..rows)
            .map(|r| {
                RowDef::new(format!("r{r}")).with_cells(
                    (0..columns)
                        .map(|c| Cell::text(format!("r{r}c{c}")))
                        .collect(),
                )
            })
            .collect(),
        (0..columns).map(|c| ColumnDef::new(format!("c{c}"))).collect(),
    )
}

/// Single row holding the given cells, one column per cell.
pub fn row_of(cells: Vec<Cell>) -> GridProps {
    let columns = (0..cells.len())
        .map(|c| ColumnDef::new(format!("c{c}")))
        .collect();
    GridProps::new(vec![RowDef::new("r0").with_cells(cells)], columns)
}

/// Run the pipeline from an empty state.
pub fn derived(props: GridProps) -> State {
    derive_state(&PropsHandle::new(props), State::new())
}

/// Derived state with focus requested at (`row_id`, `column_id`).
pub fn focused(props: GridProps, row_id: &str, column_id: &str) -> State {
    derived(props.with_focus(CellLocation::new(row_id, column_id)))
}

pub fn location(state: &State, row_idx: usize, column_idx: usize) -> Location {
    state
        .cell_matrix
        .as_ref()
        .expect("matrix built")
        .get_location(row_idx, column_idx)
        .expect("location in bounds")
}

pub fn focused_ids(state: &State) -> (String, String) {
    let focused = state.focused_location.as_ref().expect("focused");
    (focused.row_id().to_string(), focused.column_id().to_string())
}
