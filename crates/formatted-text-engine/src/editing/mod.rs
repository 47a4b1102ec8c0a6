/*!
 * # Editing
 *
 * Block and line edits live on the model types themselves. This module holds
 * edits that are described as data and applied later.
 *
 * - **`delta`**: `Delta`, a list of per-line modify / remove / insert actions
 *   that can be applied to a `Block` all at once.
 *
 * ```rust
 * use formatted_text_engine::editing::Delta;
 * use formatted_text_engine::models::{Block, BlockType, Line};
 *
 * let mut block = Block::new(BlockType::Paragraph);
 * block.push_line("first").push_line("second");
 *
 * Delta::new()
 *     .remove(0)
 *     .insert(1, Line::from_text("third"))
 *     .apply(&mut block)
 *     .unwrap();
 *
 * assert_eq!(block.flatten(), "second\nthird");
 * ```
 */

pub mod delta;

pub use delta::{Delta, DeltaError, LineAction};
