//! Minimal depth-first template expander.
//!
//! Only vertical `each` commands are supported. Within an area, nested commands
//! are expanded before the area's static cells, which gives listeners the
//! children-before-parent event order the span tracker depends on. Static cells
//! are notified in row-major order.

use crate::context::RenderContext;
use crate::document::SheetDocument;
use crate::listener::{RenderSession, register_external_listener, register_merge_tracker};
use crate::spec::{
    EnumCellContent, EnumCellValue, EnumEachMode, SpecCellAddress, SpecEachCommand,
    SpecTemplateArea, XlsxMergeError,
};

/// Render `area` with its top-left template cell placed on `anchor_row`.
///
/// Returns the number of rows the rendered area occupies.
pub fn render_template(
    area: &SpecTemplateArea,
    anchor_row: usize,
    ctx: &mut RenderContext,
    session: &mut RenderSession,
    doc: &mut dyn SheetDocument,
) -> Result<usize, XlsxMergeError> {
    area.region.validate()?;
    apply_area(area, anchor_row, ctx, session, doc)
}

fn apply_area(
    area: &SpecTemplateArea,
    anchor_row: usize,
    ctx: &mut RenderContext,
    session: &mut RenderSession,
    doc: &mut dyn SheetDocument,
) -> Result<usize, XlsxMergeError> {
    let region = &area.region;
    let cell_anchor = SpecCellAddress::new(region.sheet.clone(), anchor_row, region.col_first);
    for listener in session.listeners_of(region) {
        listener.borrow_mut().before_apply_at_cell(&cell_anchor);
    }

    let mut l_commands: Vec<&SpecEachCommand> = area.commands.iter().collect();
    l_commands.sort_by_key(|command| command.area.region.row_first);

    // (band last template row, rendered band height - template band height)
    let mut l_growths: Vec<(usize, isize)> = Vec::new();
    let mut n_extent = 0;
    for l_band in derive_command_bands(&l_commands) {
        let n_band_first = l_band[0].area.region.row_first;
        let n_band_last = l_band
            .iter()
            .map(|command| command.area.region.row_last)
            .max()
            .unwrap_or(n_band_first);
        let n_shift = derive_shift(&l_growths, n_band_first);

        // Side-by-side commands grow in parallel; the tallest one sets the band height.
        let mut n_band_height = 0;
        for command in l_band {
            let region_cmd = &command.area.region;
            let n_row_target = anchor_row.saturating_add_signed(
                derive_row_offset(region.row_first, region_cmd.row_first) + n_shift,
            );
            let n_height = activate_each_command(command, n_row_target, ctx, session, doc)?;
            n_band_height = usize::max(
                n_band_height,
                (region_cmd.row_first - n_band_first)
                    + n_height
                    + (n_band_last - region_cmd.row_last),
            );
            n_extent = usize::max(n_extent, (n_row_target + n_height).saturating_sub(anchor_row));
        }
        l_growths.push((
            n_band_last,
            to_isize(n_band_height) - to_isize(n_band_last - n_band_first + 1),
        ));
    }

    let mut l_cells: Vec<_> = area.cells.iter().collect();
    l_cells.sort_by_key(|cell| (cell.row, cell.col));
    let mut l_written: Vec<(SpecCellAddress, SpecCellAddress)> = Vec::with_capacity(l_cells.len());
    for cell in l_cells {
        let n_row_target = anchor_row.saturating_add_signed(
            derive_row_offset(region.row_first, cell.row) + derive_shift(&l_growths, cell.row),
        );
        let cell_src = SpecCellAddress::new(region.sheet.clone(), cell.row, cell.col);
        let cell_target = SpecCellAddress::new(region.sheet.clone(), n_row_target, cell.col);
        let value = match &cell.content {
            EnumCellContent::Literal(text) => EnumCellValue::String(text.clone()),
            EnumCellContent::Field(path) => ctx
                .resolve_path(path)
                .map(|value| value.to_cell_value())
                .unwrap_or_default(),
        };

        for listener in session.listeners_of(region) {
            listener
                .borrow_mut()
                .before_transform_cell(&cell_src, &cell_target);
        }
        doc.write_cell(&cell_target, value, cell.border);
        n_extent = usize::max(n_extent, (n_row_target + 1).saturating_sub(anchor_row));
        l_written.push((cell_src, cell_target));
    }

    // After-events fire once every static cell of the area is written.
    for (cell_src, cell_target) in &l_written {
        for listener in session.listeners_of(region) {
            listener
                .borrow_mut()
                .after_transform_cell(cell_src, cell_target, doc)?;
        }
    }

    for listener in session.listeners_of(region) {
        listener.borrow_mut().after_apply_at_cell(&cell_anchor);
    }

    let n_growth_total: isize = l_growths.iter().map(|(_, n_growth)| n_growth).sum();
    let n_height = to_isize(region.height()) + n_growth_total;
    Ok(usize::max(n_extent, usize::try_from(n_height).unwrap_or(0)))
}

// Registration runs before the first item so the listeners see every cell.
fn activate_each_command(
    command: &SpecEachCommand,
    anchor_row: usize,
    ctx: &mut RenderContext,
    session: &mut RenderSession,
    doc: &mut dyn SheetDocument,
) -> Result<usize, XlsxMergeError> {
    let region = &command.area.region;
    region.validate()?;
    let cell_anchor = SpecCellAddress::new(region.sheet.clone(), anchor_row, region.col_first);
    let l_items = ctx.get_list(&command.items)?.to_vec();
    log::debug!(
        "{}: var={}, items={}, n={}, at {cell_anchor}",
        command.mode.command_name(),
        command.var,
        command.items,
        l_items.len()
    );

    match &command.mode {
        EnumEachMode::Plain => {}
        EnumEachMode::Listener(name) => {
            register_external_listener(session, command, name.as_deref(), ctx, &cell_anchor)?;
        }
        EnumEachMode::Merge => {
            register_merge_tracker(session, command, l_items.len(), &cell_anchor)?;
        }
    }

    let mut n_row_cursor = anchor_row;
    for item in l_items {
        let value_prev = ctx.put_var(command.var.as_str(), item);
        let res_height = apply_area(&command.area, n_row_cursor, ctx, session, doc);
        ctx.restore_var(&command.var, value_prev);
        n_row_cursor += res_height?;
    }
    Ok(n_row_cursor - anchor_row)
}

/// Split row-sorted commands into bands whose template row ranges overlap.
fn derive_command_bands<'a>(commands: &[&'a SpecEachCommand]) -> Vec<Vec<&'a SpecEachCommand>> {
    let mut l_bands: Vec<Vec<&'a SpecEachCommand>> = Vec::new();
    let mut n_band_last = 0;
    for &command in commands {
        let region_cmd = &command.area.region;
        match l_bands.last_mut() {
            Some(l_band) if region_cmd.row_first <= n_band_last => {
                l_band.push(command);
                n_band_last = usize::max(n_band_last, region_cmd.row_last);
            }
            _ => {
                l_bands.push(vec![command]);
                n_band_last = region_cmd.row_last;
            }
        }
    }
    l_bands
}

fn derive_row_offset(row_base: usize, row: usize) -> isize {
    to_isize(row) - to_isize(row_base)
}

/// Total growth of command bands ending strictly above template row `row`.
fn derive_shift(growths: &[(usize, isize)], row: usize) -> isize {
    growths
        .iter()
        .filter(|(n_row_last, _)| *n_row_last < row)
        .map(|(_, n_growth)| n_growth)
        .sum()
}

fn to_isize(value: usize) -> isize {
    isize::try_from(value).unwrap_or(isize::MAX)
}
