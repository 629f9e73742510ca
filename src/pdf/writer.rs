// ページ組立: EncodedPage -> A4ページ(画像XObject + 配置コンテンツストリーム)

use lopdf::{Document, Object, ObjectId, Stream, dictionary};

use crate::encode::EncodedPage;
use crate::error::ScanPdfError;
use crate::pdf::image_xobject::build_image_xobject;
use crate::pdf::layout::{Placement, page_size_pt};

const PRODUCER: &str = concat!("scan_pdf ", env!("CARGO_PKG_VERSION"));

/// EncodedPageを順番にA4ページとして追加し、1つのPDFを組み立てる。
pub struct DocumentWriter {
    doc: Document,
    pages_id: ObjectId,
    page_ids: Vec<ObjectId>,
    title: Option<String>,
}

impl Default for DocumentWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentWriter {
    pub fn new() -> Self {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        Self {
            doc,
            pages_id,
            page_ids: Vec::new(),
            title: None,
        }
    }

    /// ドキュメント情報辞書のTitleを設定する。
    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = Some(title.into());
    }

    /// 配置用のコンテンツストリームを生成する。
    ///
    /// `q <w> 0 0 <h> <x> <y> cm /<name> Do Q`
    pub fn build_placement_content_stream(image_name: &str, placement: &Placement) -> Vec<u8> {
        let [a, b, c, d, e, f] = placement.to_pdf_matrix();
        format!("q {a:.4} {b} {c} {d:.4} {e:.4} {f:.4} cm /{image_name} Do Q").into_bytes()
    }

    /// 1ページを追加する。戻り値はページのオブジェクトID。
    ///
    /// 配置は埋め込んだ画像自身の寸法から計算する。
    pub fn add_page(&mut self, page: &EncodedPage) -> crate::error::Result<ObjectId> {
        if page.width == 0 || page.height == 0 {
            return Err(ScanPdfError::assembly(format!(
                "page {} has malformed dimensions {}x{}",
                page.sequence_index, page.width, page.height
            )));
        }
        let xobject = build_image_xobject(page)?;
        let placement = Placement::fit(xobject.width, xobject.height).ok_or_else(|| {
            ScanPdfError::assembly(format!(
                "page {} embeds a {}x{} image",
                page.sequence_index, xobject.width, xobject.height
            ))
        })?;

        let image_id = self.doc.add_object(Object::Stream(xobject.stream));

        let mut xobject_dict = lopdf::Dictionary::new();
        xobject_dict.set("Im0", Object::Reference(image_id));
        let resources_id = self.doc.add_object(dictionary! {
            "XObject" => Object::Dictionary(xobject_dict),
        });

        let content_bytes = Self::build_placement_content_stream("Im0", &placement);
        let content_id = self
            .doc
            .add_object(Object::Stream(Stream::new(lopdf::Dictionary::new(), content_bytes)));

        let (width_pt, height_pt) = page_size_pt();
        let page_id = self.doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => self.pages_id,
            "MediaBox" => vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::Real(width_pt as f32),
                Object::Real(height_pt as f32),
            ],
            "Resources" => resources_id,
            "Contents" => content_id,
        });
        self.page_ids.push(page_id);
        Ok(page_id)
    }

    /// Pages/Catalog/Infoを確定し、PDFをバイト列として出力する。
    pub fn finish(mut self) -> crate::error::Result<Vec<u8>> {
        if self.page_ids.is_empty() {
            return Err(ScanPdfError::assembly("document has no pages"));
        }

        let kids: Vec<Object> = self.page_ids.iter().map(|&id| id.into()).collect();
        let pages = dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => self.page_ids.len() as i64,
        };
        self.doc
            .objects
            .insert(self.pages_id, Object::Dictionary(pages));

        let catalog_id = self.doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => self.pages_id,
        });
        self.doc.trailer.set("Root", catalog_id);

        let mut info = dictionary! {
            "Producer" => Object::string_literal(PRODUCER),
        };
        if let Some(title) = &self.title {
            info.set("Title", Object::string_literal(title.as_str()));
        }
        let info_id = self.doc.add_object(info);
        self.doc.trailer.set("Info", info_id);

        // 画像ストリームは with_compression(false) のため対象外
        self.doc.compress();

        let mut buf = Vec::new();
        self.doc
            .save_to(&mut buf)
            .map_err(|e| ScanPdfError::pdf_write(e.to_string()))?;
        Ok(buf)
    }
}
