//! This module is in charge of outputting the final analysis results to the
//! standard output and various files

use crate::{
    analysis::PairSign,
    config::Configuration,
    histos::{Histogram, Histograms},
    numeric::{floats, Float},
    trkcut::{SelectionStage, SELECTION_COUNTER},
    zdc::NeutronClass,
    Result,
};

use eyre::WrapErr;
use log::info;
use time::{macros::format_description, OffsetDateTime};

use std::{
    fs::File,
    io::{self, BufWriter, Write},
    time::Duration,
};

/// File which receives every histogram
const HISTOGRAMS_FILE: &str = "upcrho.hist";

/// File which receives the execution timings
const TIMINGS_FILE: &str = "upcrho.times";

/// Number of significant digits in file output
const SIG_DIGITS: usize = (floats::DIGITS - 1) as usize;

/// Output the analysis results to the console and to disk
pub fn dump_results(
    cfg: &Configuration,
    histos: &Histograms,
    elapsed_time: Duration,
) -> Result<()> {
    // Print out a summary on stdout
    print_summary(cfg, histos);

    // Compute a timestamp of when the run ended
    let timestamp = OffsetDateTime::now_utc().format(format_description!(
        "[day]-[month repr:short]-[year repr:last_two]   [hour]:[minute]:[second]"
    ))?;

    // Write execution timings to a file
    {
        let mut tim_file = create(TIMINGS_FILE)?;
        let tim_file = &mut tim_file;
        let elapsed_secs = elapsed_time.as_secs_f64() as Float;
        writeln_col(tim_file, &timestamp[..])?;
        writeln_col(tim_file, "---------------------------------------------")?;
        writeln_col(tim_file, ("Elapsed time (s)", elapsed_secs))?;
        let secs_per_ev = elapsed_secs / (cfg.num_events as Float);
        writeln_col(tim_file, ("Elapsed time per event (s)", secs_per_ev))?;
        tim_file.flush()?;
    }

    // Write every histogram, in name order
    {
        let mut hist_file = create(HISTOGRAMS_FILE)?;
        let hist_file = &mut hist_file;
        writeln_col(hist_file, &timestamp[..])?;
        writeln_col(hist_file, ("Number of events", cfg.num_events))?;
        writeln_col(hist_file, ("Number of histograms", histos.len()))?;
        for (name, histo) in histos.iter() {
            write_histogram(hist_file, name, histo)
                .wrap_err_with(|| format!("Failed to write histogram {name}"))?;
        }
        hist_file.flush()?;
    }

    info!("Histograms written to {HISTOGRAMS_FILE}, timings to {TIMINGS_FILE}");
    Ok(())
}

/// Print the selection counter and the ρ⁰ candidate yields
fn print_summary(cfg: &Configuration, histos: &Histograms) {
    let entries = |name: &str| histos.get(name).map_or(0, Histogram::entries);

    println!("Processed {} events", cfg.num_events);
    println!();

    println!("Track selection:");
    if let Some(counter) = histos.get(SELECTION_COUNTER) {
        for stage in SelectionStage::ALL {
            let count = counter.bin_content(&[stage as usize + 1]);
            println!("  {:<31}: {}", stage.label(), count);
        }
    }
    println!();

    println!("Two-pion systems passing the cuts:");
    let groups = std::iter::once("no-selection").chain(NeutronClass::ALL.map(NeutronClass::label));
    for group in groups {
        let counts = PairSign::ALL.map(|sign| {
            entries(&format!("system/2pi/cut/{group}/{}/hM", sign.system_dir()))
        });
        println!(
            "  {:<12} unlike-sign: {:>8}  like-sign (+): {:>8}  like-sign (-): {:>8}",
            group, counts[0], counts[1], counts[2]
        );
    }
    println!();

    println!("Four-pion systems: {}", entries("system/4pi/hM"));
    println!("Six-pion systems: {}", entries("system/6pi/hM"));
}

/// Write down one histogram: header, binning, then its non-empty bins
fn write_histogram(file: &mut impl Write, name: &str, histo: &Histogram) -> io::Result<()> {
    writeln!(file)?;
    writeln_col(file, ("Histogram", name))?;
    writeln_col(file, ("Title", histo.title()))?;
    writeln_col(file, ("Entries", histo.entries()))?;
    writeln_col(file, ("Sum of weights", histo.sum_of_weights()))?;
    for (idx, axis) in histo.axes().iter().enumerate() {
        write!(
            file,
            " {:<31}: {} bins, edges",
            format!("Axis {idx}"),
            axis.num_bins()
        )?;
        for bin in 1..=axis.num_bins() {
            write!(file, " ")?;
            write_engineering(file, axis.low_edge(bin), SIG_DIGITS)?;
        }
        writeln!(file)?;
    }
    if !histo.labels().is_empty() {
        writeln_col(file, ("Labels", histo.labels().join(" | ").as_str()))?;
    }
    for (bins, content) in histo.filled_bins() {
        for bin in bins {
            write!(file, "{bin:>6}")?;
        }
        write!(file, "  ")?;
        write_engineering(file, content, SIG_DIGITS)?;
        writeln!(file)?;
    }
    Ok(())
}

/// Create an output file, naming it in errors
fn create(file_name: &str) -> Result<BufWriter<File>> {
    let file = File::create(file_name).wrap_err_with(|| format!("Could not create {file_name}"))?;
    Ok(BufWriter::new(file))
}

/// Text output facility with fixed-size key columns
fn writeln_col(file: &mut impl Write, data: impl WriteColumn) -> io::Result<()> {
    write!(file, " ")?;
    data.write(file)?;
    writeln!(file)
}

/// Trait implemented by things which can be written in column style
trait WriteColumn: Sized {
    /// Write down `self` to the output file
    fn write(self, file: &mut impl Write) -> io::Result<()>;
}

impl WriteColumn for &str {
    // Strings work in the usual way
    fn write(self, file: &mut impl Write) -> io::Result<()> {
        write!(file, "{self}")
    }
}

impl WriteColumn for usize {
    // Integers work in the usual way too
    fn write(self, file: &mut impl Write) -> io::Result<()> {
        write!(file, "{self}")
    }
}

impl WriteColumn for Float {
    // Close approximation of the %g format
    fn write(self, file: &mut impl Write) -> io::Result<()> {
        write_engineering(file, self, SIG_DIGITS)
    }
}

impl<T: WriteColumn> WriteColumn for (&str, T) {
    // Key-value output that uses fixed-size columns for better readability
    fn write(self, file: &mut impl Write) -> io::Result<()> {
        write!(file, "{:<31}: ", self.0)?;
        self.1.write(file)
    }
}

/// Write a floating-point number using "engineering" notation
///
/// Analogous to the %g format of the C printf function, this method switches
/// between naive and scientific notation for floating-point numbers when the
/// number being printed becomes so small that printing leading zeroes could end
/// up larger than the scientific notation, or so large that we would be forced
/// to print more significant digits than requested.
///
fn write_engineering(writer: &mut impl Write, x: Float, sig_digits: usize) -> io::Result<()> {
    let mut precision = sig_digits - 1;
    if x == 0. {
        // Zero is special because you can't take its log
        write!(writer, "0")
    } else {
        // Otherwise, use log to evaluate order of magnitude
        let log_x = x.abs().log10();
        if log_x >= -3. && log_x < (sig_digits as Float) {
            // Rust's precision counts digits after the decimal point, so it
            // must shrink as the magnitude grows
            precision = (precision as isize - log_x.trunc() as isize) as usize;

            // The leading zero of numbers below 1 is not significant
            if log_x < 0. {
                precision += 1
            }

            // No trailing zeros or decimal point in naive notation
            let str_with_zeros = format!("{:.1$}", x, precision);
            if str_with_zeros.contains('.') {
                write!(
                    writer,
                    "{}",
                    str_with_zeros.trim_end_matches('0').trim_end_matches('.')
                )
            } else {
                write!(writer, "{}", str_with_zeros)
            }
        } else {
            // Print using scientific notation
            write!(writer, "{:.1$e}", x, precision)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::histos::{Axis, HistogramSink};

    fn engineering(x: Float, sig_digits: usize) -> String {
        let mut buf = Vec::new();
        write_engineering(&mut buf, x, sig_digits).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn engineering_notation() {
        assert_eq!(engineering(0., 6), "0");
        assert_eq!(engineering(1.5, 6), "1.5");
        assert_eq!(engineering(-0.25, 6), "-0.25");
        assert_eq!(engineering(100., 6), "100");
        assert_eq!(engineering(1.5e-7, 3), "1.50e-7");

        // Numbers with as many integer digits as requested go scientific
        assert_eq!(engineering(123456., 6), "123456");
        assert_eq!(engineering(1e6, 6), "1.00000e6");
    }

    #[test]
    fn histogram_listing() {
        let mut histos = Histograms::new();
        histos
            .add("h", ";x;counts", vec![Axis::uniform(2, 0., 2.)])
            .set_labels(&["first", "second"]);
        histos.fill("h", 1.5);
        histos.fill_weighted("h", &[1.5], 2.);

        let mut buf = Vec::new();
        write_histogram(&mut buf, "h", histos.get("h").unwrap()).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.contains(" Histogram                      : h\n"));
        assert!(text.contains(" Entries                        : 2\n"));
        assert!(text.contains("2 bins, edges 0 1\n"));
        assert!(text.contains("first | second"));
        assert!(text.trim_end().ends_with("     2  3"));
    }
}
