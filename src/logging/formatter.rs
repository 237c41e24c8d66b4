use std::fmt;
use tracing::{Event, Subscriber};
use tracing_subscriber::fmt::{format::Writer, FmtContext, FormatEvent, FormatFields};
use tracing_subscriber::registry::LookupSpan;

/// Formatter that wraps each field in brackets.
/// Format: [TIMESTAMP] [LEVEL] [SPAN PATH] [TARGET: FILE:LINE]: MESSAGE
///
/// The span path joins the active spans from the root, e.g. `scene:pool`, so
/// every line of a multi-scene run says which scene it belongs to.
pub struct BracketedFormatter;

impl<S, N> FormatEvent<S, N> for BracketedFormatter
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        let metadata = event.metadata();

        let now = chrono::Local::now();
        write!(writer, "[{}] ", now.format("%Y-%m-%dT%H:%M:%S%.3f%:z"))?;
        write!(writer, "[{:5}] ", metadata.level())?;

        let span_path = ctx
            .event_scope()
            .map(|scope| {
                scope
                    .from_root()
                    .map(|span| span.name())
                    .collect::<Vec<_>>()
                    .join(":")
            })
            .unwrap_or_else(|| "-".to_string());
        write!(writer, "[{}] ", span_path)?;

        if let (Some(file), Some(line)) = (metadata.file(), metadata.line()) {
            write!(writer, "[{}: {}:{}]: ", metadata.target(), file, line)?;
        } else {
            write!(writer, "[{}]: ", metadata.target())?;
        }

        ctx.field_format().format_fields(writer.by_ref(), event)?;

        // Span fields such as the scene id trail the message
        if let Some(scope) = ctx.event_scope() {
            for span in scope.from_root() {
                let extensions = span.extensions();
                if let Some(fields) = extensions.get::<tracing_subscriber::fmt::FormattedFields<N>>() {
                    if !fields.is_empty() {
                        write!(writer, " {{{}}}", fields)?;
                    }
                }
            }
        }

        writeln!(writer)
    }
}
