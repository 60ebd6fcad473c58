use folio_core::editor::{Block, FontSize, Mark, TextColor, TextRun};

use crate::cli::WriteArgs;
use crate::commands::common::{resolve_note_id, ProfileContext};
use crate::error::CliError;

/// Marks selected by the toolbar flags, in flag order
pub fn marks_from_args(args: &WriteArgs) -> Result<Vec<Mark>, CliError> {
    let mut marks = Vec::new();
    if let Some(size) = &args.size {
        marks.push(Mark::FontSize(FontSize::parse(size)?));
    }
    if let Some(color) = &args.color {
        marks.push(Mark::Color(TextColor::parse(color)?));
    }
    if args.bold {
        marks.push(Mark::Bold);
    }
    if args.italic {
        marks.push(Mark::Italic);
    }
    if args.underline {
        marks.push(Mark::Underline);
    }
    if args.strike {
        marks.push(Mark::Strike);
    }
    if let Some(highlight) = &args.highlight {
        let color = if highlight.trim().is_empty() {
            None
        } else {
            Some(TextColor::parse(highlight)?)
        };
        marks.push(Mark::Highlight(color));
    }
    Ok(marks)
}

/// One paragraph per text value, or a single list with one item each.
pub fn blocks_from_args(args: &WriteArgs) -> Result<Vec<Block>, CliError> {
    let marks = marks_from_args(args)?;
    let styled = |text: &String| {
        marks
            .iter()
            .cloned()
            .fold(TextRun::plain(text.as_str()), TextRun::with_mark)
    };

    let blocks = if args.bullets {
        vec![Block::BulletList(args.text.iter().map(|text| vec![styled(text)]).collect())]
    } else if args.numbered {
        vec![Block::OrderedList(args.text.iter().map(|text| vec![styled(text)]).collect())]
    } else {
        args.text
            .iter()
            .map(|text| Block::Paragraph(vec![styled(text)]))
            .collect()
    };
    Ok(blocks)
}

pub async fn run_write(context: &ProfileContext, args: &WriteArgs) -> Result<(), CliError> {
    let blocks = blocks_from_args(args)?;
    let mut workspace = context.open_workspace().await?;
    let id = resolve_note_id(workspace.notes(), &args.id)?;
    workspace.append_blocks(&id, &blocks).await?;
    println!("Updated note {id}");
    Ok(())
}
