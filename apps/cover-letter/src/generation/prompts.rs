// All LLM prompt constants for the Generation module.

/// System prompt for cover letter generation.
pub const COVER_LETTER_SYSTEM: &str = "You are a professional cover letter writer who helps \
    job candidates write compelling, personalized cover letters that match their writing \
    style and align with company values.";

/// Substituted when the global notes file is empty.
pub const NO_NOTES: &str = "No additional notes provided.";
/// Substituted when no header file is present.
pub const NO_HEADER: &str = "No header content provided.";
/// Substituted when no company research file is present.
pub const NO_RESEARCH: &str = "No company research provided.";

/// Cover letter prompt template.
/// Replace: {resume}, {writing_example}, {company_research}, {global_notes},
///          {header}, {company}
pub const COVER_LETTER_PROMPT_TEMPLATE: &str = r#"You are the writer of the resume input and writing example below. Keep your tone consistent with your writing style.

RESUME INPUT:
{resume}

WRITING EXAMPLE (your typical writing style and tone):
{writing_example}

COMPANY RESEARCH:
{company_research}

GLOBAL NOTES (additional instructions or corrections):
{global_notes}

HEADER CONTENT (to be placed before the cover letter):
{header}

Based on the above information, write a two-paragraph cover letter that:
1. Demonstrates why you would be a good fit for {company}
2. Maintains the same tone and writing style as shown in your writing example
3. Incorporates insights from the company research to show alignment with their values and needs
4. Highlights relevant experience from your resume in a compelling way
5. Follows any specific instructions or corrections provided in the global notes

Write the cover letter as if you are the person described in the resume input, using the writing style from the writing example, and addressing the company's specific needs and values as identified in the research. Pay special attention to any additional instructions in the global notes.

IMPORTANT: Always start the cover letter with the header content (if provided), followed by the two-paragraph cover letter body. If the header content contains outdated information (such as the date), you may replace that ONLY."#;
