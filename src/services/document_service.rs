// src/services/document_service.rs

use genpdf::{elements, style, Element};

use crate::{
    common::collation::pad_first_digit_run,
    common::error::AppError,
    models::catalog::Product,
};

/// Nome fixo com que o navegador recebe o arquivo.
pub const PRODUCT_LIST_FILE_NAME: &str = "Product_List.pdf";

const TABLE_COLUMNS: [&str; 5] = ["S.No", "Name", "Regular Price", "Sales Price", "Category"];

/// Renderiza a lista de produtos como tabela em PDF, em memória.
#[derive(Clone)]
pub struct DocumentService {
    font_dir: String,
}

impl DocumentService {
    pub fn new(font_dir: String) -> Self {
        Self { font_dir }
    }

    pub fn render_product_list(&self, products: &[Product]) -> Result<Vec<u8>, AppError> {
        // Cópia defensiva: o export ordena por S.No sem tocar na ordem de tela.
        let mut sorted = products.to_vec();
        sort_for_export(&mut sorted);

        // Carrega a fonte da pasta de fontes (Roboto, como nos demais PDFs).
        let font_family = genpdf::fonts::from_files(&self.font_dir, "Roboto", None)
            .map_err(|_| {
                AppError::FontNotFound(format!("Fonte não encontrada na pasta {}", self.font_dir))
            })?;

        let mut doc = genpdf::Document::new(font_family);
        doc.set_title("Product List");
        let mut decorator = genpdf::SimplePageDecorator::new();
        decorator.set_margins(10);
        doc.set_page_decorator(decorator);

        // Pesos das colunas: S.No (1), Nome (4), Preços (2 e 2), Categoria (2)
        let mut table = elements::TableLayout::new(vec![1, 4, 2, 2, 2]);
        table.set_cell_decorator(elements::FrameCellDecorator::new(true, true, false));

        let style_bold = style::Style::new().bold();
        let mut header = table.row();
        for title in TABLE_COLUMNS {
            header = header.element(elements::Paragraph::new(title).styled(style_bold));
        }
        header.push().expect("Table error");

        for cells in build_table_rows(&sorted) {
            let mut row = table.row();
            for cell in cells {
                row = row.element(elements::Paragraph::new(cell));
            }
            row.push().expect("Table row error");
        }

        doc.push(table);

        // Renderiza para buffer (memória); quem chama decide o download.
        let mut buffer = Vec::new();
        doc.render(&mut buffer)
            .map_err(|e| AppError::InternalServerError(anyhow::Error::msg(e.to_string())))?;

        Ok(buffer)
    }
}

/// Ordena por S.No preenchendo o primeiro trecho numérico com zeros até 3
/// dígitos, para que "9" ("009") venha antes de "10" ("010").
fn sort_for_export(products: &mut [Product]) {
    products.sort_by(|a, b| pad_first_digit_run(&a.sno).cmp(&pad_first_digit_run(&b.sno)));
}

fn build_table_rows(products: &[Product]) -> Vec<[String; 5]> {
    products
        .iter()
        .map(|product| {
            [
                product.sno.clone(),
                product.name.clone(),
                format!("Rs.{:.2}", product.regular_price),
                format!("Rs.{:.2}", product.sale_price),
                product.category.clone(),
            ]
        })
        .collect()
}
