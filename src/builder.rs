use crate::barcode::barcode_command;
use crate::consts::{
    BARCODE_X, BARCODE_Y, DETAIL_FONT_PX, DETAIL_X, DETAIL_Y, INIT_COMMANDS, LINE_ADVANCE,
    LOGO_FONT_PX, LOGO_X, LOGO_Y, PRINT_COMMAND, PRODUCT_FONT_PX, PRODUCT_X, PRODUCT_Y,
};
use crate::epl::{epl_line, GraphicsSegment};
use crate::graphics::{rasterize, FontBook};
use crate::label::{DeliveryLabelFields, LabelField};

/// One piece of a print job, in emission order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// ASCII command lines, already LF-terminated.
    Literal(Vec<u8>),
    Graphics(GraphicsSegment),
}

impl Segment {
    fn literal(lines: &[&str]) -> Self {
        let mut buf = Vec::new();
        for line in lines {
            epl_line(&mut buf, line);
        }
        Segment::Literal(buf)
    }

    pub fn encode(&self) -> Vec<u8> {
        match self {
            Segment::Literal(bytes) => bytes.clone(),
            Segment::Graphics(g) => g.encode(),
        }
    }

    pub fn encoded_len(&self) -> usize {
        match self {
            Segment::Literal(bytes) => bytes.len(),
            Segment::Graphics(g) => g.encoded_len(),
        }
    }
}

/// Ordered segments of a single label. The last one is always `P1`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PrintJob {
    segments: Vec<Segment>,
}

impl PrintJob {
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn encoded_len(&self) -> usize {
        self.segments.iter().map(Segment::encoded_len).sum()
    }

    /// Concatenate every segment into the buffer sent to the printer.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(self.encoded_len());
        for seg in &self.segments {
            match seg {
                Segment::Literal(bytes) => buf.extend_from_slice(bytes),
                Segment::Graphics(g) => buf.extend_from_slice(&g.encode()),
            }
        }
        buf
    }
}

/// The text fields of a delivery label at their fixed positions.
///
/// The dynamic detail lines sit on a cursor that starts at `DETAIL_Y` and
/// advances one `LINE_ADVANCE` per slot: the stone-memo line is always in
/// the second slot, even when the spec line is absent.
// TODO: product review of the fixed second slot; with no spec line the memo leaves a 20-dot gap.
pub fn delivery_fields(fields: &DeliveryLabelFields) -> Vec<LabelField> {
    let mut out = vec![
        LabelField::new(&fields.subdomain, LOGO_X, LOGO_Y, LOGO_FONT_PX),
        LabelField::new(&fields.product_name, PRODUCT_X, PRODUCT_Y, PRODUCT_FONT_PX),
    ];
    if let Some(spec) = fields.spec_line() {
        out.push(LabelField::new(spec, DETAIL_X, DETAIL_Y, DETAIL_FONT_PX));
    }
    if let Some(memo) = fields.stone_memo_line() {
        out.push(LabelField::new(memo, DETAIL_X, DETAIL_Y + LINE_ADVANCE, DETAIL_FONT_PX));
    }
    out
}

/// Assemble the delivery label job: init, logo, barcode, product name,
/// optional spec line, optional stone-memo line, print.
pub fn build_delivery_job(fonts: &FontBook, family: &str, fields: &DeliveryLabelFields) -> PrintJob {
    let text = delivery_fields(fields);
    let (logo, rest) = text.split_at(1);

    let mut segments = vec![Segment::literal(INIT_COMMANDS)];
    segments.push(Segment::Graphics(rasterize(fonts, &logo[0], family)));

    let mut barcode = Vec::new();
    barcode_command(&mut barcode, BARCODE_X, BARCODE_Y, &fields.serial);
    segments.push(Segment::Literal(barcode));

    segments.extend(rest.iter().map(|f| Segment::Graphics(rasterize(fonts, f, family))));
    segments.push(Segment::literal(&[PRINT_COMMAND]));

    let job = PrintJob { segments };
    tracing::debug!(serial = %fields.serial, segments = job.segments.len(),
        bytes = job.encoded_len(), "built delivery label");
    job
}

/// `buildDeliveryLabel(fields) -> bytes`.
pub fn build_delivery_label(fonts: &FontBook, family: &str, fields: &DeliveryLabelFields) -> Vec<u8> {
    build_delivery_job(fonts, family, fields).to_bytes()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const FIXTURE: &[u8] = include_bytes!("../tests/fonts/DejaVuSans-Bold.ttf");
    const FAMILY: &str = "DejaVu Sans";

    fn fonts() -> FontBook {
        let mut book = FontBook::new();
        book.insert_bytes(FAMILY, FIXTURE.to_vec()).unwrap();
        book
    }

    fn positions(fields: &DeliveryLabelFields) -> Vec<(u32, u32, u32)> {
        delivery_fields(fields).iter().map(|f| (f.x, f.y, f.font_size_px)).collect()
    }

    #[test]
    fn test_minimal_layout() {
        let f = DeliveryLabelFields::new("min", "Ring", "FC1");
        assert_eq!(positions(&f), vec![(10, 10, 16), (10, 80, 16)]);
    }

    #[test]
    fn test_full_layout() {
        let f = DeliveryLabelFields::new("min", "Ring", "FC1").material("18K").assistant_stone_name("CZ");
        assert_eq!(
            positions(&f),
            vec![(10, 10, 16), (10, 80, 16), (10, 95, 14), (10, 115, 14)]
        );
    }

    #[test]
    fn test_memo_slot_fixed_without_spec_line() {
        let f = DeliveryLabelFields::new("min", "Ring", "FC1").main_stone_memo("1ct");
        assert_eq!(positions(&f), vec![(10, 10, 16), (10, 80, 16), (10, 115, 14)]);
    }

    #[test]
    fn test_emission_order() {
        let f = DeliveryLabelFields::new("MIN", "RING", "FC1").weight("2").main_stone_memo("X");
        let job = build_delivery_job(&fonts(), FAMILY, &f);
        let segs = job.segments();
        assert_eq!(segs.len(), 7);
        assert_eq!(segs[0], Segment::Literal(b"N\nq144\nQ144,16\nJFJ\n".to_vec()));
        assert!(matches!(&segs[1], Segment::Graphics(g) if (g.x, g.y) == (10, 10)));
        assert_eq!(segs[2], Segment::Literal(b"B10,28,0,1,1,2,25,N,\"FC1\"\n".to_vec()));
        assert!(matches!(&segs[3], Segment::Graphics(g) if (g.x, g.y) == (10, 80)));
        assert!(matches!(&segs[4], Segment::Graphics(g) if (g.x, g.y, g.height) == (10, 95, 17)));
        assert!(matches!(&segs[5], Segment::Graphics(g) if (g.x, g.y) == (10, 115)));
        assert_eq!(segs[6], Segment::Literal(b"P1\n".to_vec()));
    }

    #[test]
    fn test_bytes_frame() {
        let bytes = build_delivery_label(&fonts(), FAMILY, &DeliveryLabelFields::new("MIN", "RING", "FC1"));
        assert!(bytes.starts_with(b"N\nq144\nQ144,16\nJFJ\nGW10,10,"));
        assert!(bytes.ends_with(b"\nP1\n"));
    }

    #[test]
    fn test_concatenation_keeps_every_byte() {
        let f = DeliveryLabelFields::new("MIN", "RING", "FC1").material("18K").size("13");
        let job = build_delivery_job(&fonts(), FAMILY, &f);
        let independent: usize = job.segments().iter().map(|s| s.encode().len()).sum();
        assert_eq!(job.to_bytes().len(), independent);
        assert_eq!(job.encoded_len(), independent);
    }

    #[test]
    fn test_missing_font_degrades_to_literals() {
        let job = build_delivery_job(&FontBook::new(), FAMILY, &DeliveryLabelFields::new("MIN", "RING", "FC1"));
        assert_eq!(
            job.to_bytes(),
            b"N\nq144\nQ144,16\nJFJ\nB10,28,0,1,1,2,25,N,\"FC1\"\nP1\n".to_vec()
        );
    }
}
